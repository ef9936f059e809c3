use std::ffi::OsString;
use std::path::PathBuf;

use v2bflow::config::{split_opts, DEFAULT_LAYOUT_OPTS};
use v2bflow::stage::{LayoutInput, LayoutTool};

use crate::Vpr;

#[test]
fn strips_blif_extension_from_circuit_name() {
    let cmd = Vpr::new("/opt/vpr").command(&LayoutInput {
        arch_path: PathBuf::from("arch.xml"),
        logic_path: PathBuf::from("out/design_stratixiv.blif"),
        extra_args: split_opts(DEFAULT_LAYOUT_OPTS),
    });

    assert_eq!(cmd.program(), PathBuf::from("/opt/vpr/vpr"));
    let expected: Vec<OsString> = [
        "arch.xml",
        "out/design_stratixiv",
        "--fast",
        "--timing_analysis",
        "off",
        "-route_chan_width",
        "300",
        "--nodisp",
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    assert_eq!(cmd.get_args(), expected.as_slice());
}

#[test]
fn circuit_without_extension_is_passed_through() {
    let cmd = Vpr::builder()
        .bin_dir("/opt/vpr")
        .build()
        .unwrap()
        .command(&LayoutInput {
            arch_path: PathBuf::from("arch.xml"),
            logic_path: PathBuf::from("design"),
            extra_args: Vec::new(),
        });
    assert_eq!(cmd.get_args(), [OsString::from("arch.xml"), OsString::from("design")]);
}
