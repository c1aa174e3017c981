//! Argument parsing and validation
//! Uses library `clap`

use std::ffi::OsStr;

use clap::{Arg, Command, ValueHint};

use crate::datasets::DATA_SET_COUNT;

// up to 32bit value
pub fn is_positive_number(num: &str) -> Result<(), String> {
    let n = num.parse::<u32>();
    match n {
        Ok(n) => {
            if n > 0 {
                Ok(())
            } else {
                Err("Number must be greater than 0".into())
            }
        }
        Err(_) => Err("Number required".into()),
    }
}

pub fn is_data_set_index(num: &str) -> Result<(), String> {
    match num.parse::<usize>() {
        Ok(n) if n < DATA_SET_COUNT => Ok(()),
        _ => Err(format!(
            "Data set index must be in range <0;{}>",
            DATA_SET_COUNT - 1
        )),
    }
}

const TF_MODE_NAMES: &[&str] = &["normalized", "native"];

pub fn get_command<'a>() -> Command<'a> {
    Command::new("Vol-eval")
        .version("0.1.0")
        .about("Segmentation volume rendering setup and evaluation")
        .arg(Arg::new("verbose").help("Verbose output").long("verbose"))
        .arg(
            Arg::new("width")
                .help("Render width")
                .long("width")
                .short('x')
                .value_name("PIXELS")
                .default_value("1920")
                .validator(is_positive_number),
        )
        .arg(
            Arg::new("height")
                .help("Render height")
                .long("height")
                .short('y')
                .value_name("PIXELS")
                .default_value("1080")
                .validator(is_positive_number),
        )
        .arg(
            Arg::new("camera-import")
                .help("Pose to use instead of the camera from the parameter file")
                .long("camera-import")
                .value_name("FILE")
                .allow_invalid_utf8(true)
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("camera-export")
                .help("Camera pose export file")
                .long("camera-export")
                .value_name("FILE")
                .allow_invalid_utf8(true)
                .value_hint(ValueHint::FilePath)
                .default_value_os(OsStr::new("./camera.cam")),
        )
        .arg(
            Arg::new("camera-state")
                .help("Camera state file, applied after the parameter file")
                .long("camera-state")
                .value_name("FILE")
                .allow_invalid_utf8(true)
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("camera-state-text")
                .help("Camera state file is in text form")
                .long("camera-state-text")
                .requires("camera-state"),
        )
        .arg(
            Arg::new("data-dir")
                .help("Data base directory")
                .long("data-dir")
                .value_name("DIR")
                .allow_invalid_utf8(true)
                .value_hint(ValueHint::DirPath)
                .default_value_os(OsStr::new("./")),
        )
        .arg(
            Arg::new("vcfg-dir")
                .help(".vcfg base directory")
                .long("vcfg-dir")
                .value_name("DIR")
                .allow_invalid_utf8(true)
                .value_hint(ValueHint::DirPath)
                .default_value_os(OsStr::new("./")),
        )
        .arg(
            Arg::new("vcfg-file")
                .help(".vcfg parameter file (overrides auto select from vcfg-dir)")
                .long("vcfg-file")
                .value_name("FILE")
                .allow_invalid_utf8(true)
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("volume-file")
                .help("Label volume file (overrides auto select from data-dir)")
                .long("volume-file")
                .value_name("FILE")
                .allow_invalid_utf8(true)
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("results-file")
                .help("Results .csv file")
                .long("results-file")
                .value_name("FILE")
                .allow_invalid_utf8(true)
                .value_hint(ValueHint::FilePath)
                .default_value_os(OsStr::new("./results.csv")),
        )
        .arg(
            Arg::new("frame-times")
                .help("Frame times in ms from the renderer, one per line")
                .long("frame-times")
                .value_name("FILE")
                .allow_invalid_utf8(true)
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("tf-mode")
                .help("Domain of transfer function control points")
                .long("tf-mode")
                .value_name("MODE")
                .default_value("normalized")
                .possible_values(TF_MODE_NAMES),
        )
        .arg(
            Arg::new("tf-output")
                .help("Write transfer function control points as .csv")
                .long("tf-output")
                .value_name("FILE")
                .allow_invalid_utf8(true)
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("data-set")
                .help("Data set index")
                .long("data-set")
                .short('d')
                .value_name("INDEX")
                .default_value("0")
                .validator(is_data_set_index),
        )
        .arg(
            Arg::new("list-data")
                .help("Prints all data set IDs and exits, returns their count")
                .long("list-data"),
        )
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn validators() {
        assert!(is_positive_number("12").is_ok());
        assert!(is_positive_number("0").is_err());
        assert!(is_positive_number("-3").is_err());

        assert!(is_data_set_index("0").is_ok());
        assert!(is_data_set_index("8").is_ok());
        assert!(is_data_set_index("9").is_err());
        assert!(is_data_set_index("cells").is_err());
    }

    #[test]
    fn command_is_consistent() {
        get_command().debug_assert();
    }

    #[test]
    fn state_text_requires_state() {
        let res = get_command().try_get_matches_from(["vol_eval", "--camera-state-text"]);
        assert!(res.is_err());
    }
}
