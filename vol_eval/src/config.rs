use std::path::PathBuf;

use clap::ArgMatches;
use segvol_lib::transfer_function::TfMode;

use crate::datasets::DataSet;

fn path_of(args: &ArgMatches, key: &str) -> Option<PathBuf> {
    args.value_of_os(key).map(PathBuf::from)
}

/// App configuration
/// Config is built from args parsed by `clap`
#[derive(Debug)]
pub struct Config {
    pub verbose: bool,
    pub render_width: u32,
    pub render_height: u32,
    /// Pose that replaces the one from the parameter file
    pub camera_import_file: Option<PathBuf>,
    pub camera_export_file: PathBuf,
    /// Camera state file and whether it is in text form
    pub camera_state_file: Option<(PathBuf, bool)>,
    pub data_dir: PathBuf,
    pub vcfg_dir: PathBuf,
    pub vcfg_override_file: Option<PathBuf>,
    pub volume_override_file: Option<PathBuf>,
    pub results_file: PathBuf,
    pub frame_times_file: Option<PathBuf>,
    pub tf_mode: TfMode,
    pub tf_output_file: Option<PathBuf>,
    pub data_set: DataSet,
    /// Print data sets and exit
    pub list_data: bool,
}

impl Config {
    pub fn from_args(args: ArgMatches) -> Result<Config, String> {
        // Values with defaults and validators, parse cannot fail
        let render_width = args
            .value_of("width")
            .and_then(|v| v.parse().ok())
            .ok_or("Invalid width")?;
        let render_height = args
            .value_of("height")
            .and_then(|v| v.parse().ok())
            .ok_or("Invalid height")?;
        let data_set = args
            .value_of("data-set")
            .and_then(|v| v.parse().ok())
            .and_then(DataSet::from_index)
            .ok_or("Invalid data set")?;
        let tf_mode = args
            .value_of("tf-mode")
            .unwrap_or("normalized")
            .parse::<TfMode>()?;

        let camera_state_file =
            path_of(&args, "camera-state").map(|p| (p, args.is_present("camera-state-text")));

        Ok(Config {
            verbose: args.is_present("verbose"),
            render_width,
            render_height,
            camera_import_file: path_of(&args, "camera-import"),
            camera_export_file: path_of(&args, "camera-export").unwrap_or_default(),
            camera_state_file,
            data_dir: path_of(&args, "data-dir").unwrap_or_default(),
            vcfg_dir: path_of(&args, "vcfg-dir").unwrap_or_default(),
            vcfg_override_file: path_of(&args, "vcfg-file"),
            volume_override_file: path_of(&args, "volume-file"),
            results_file: path_of(&args, "results-file").unwrap_or_default(),
            frame_times_file: path_of(&args, "frame-times"),
            tf_mode,
            tf_output_file: path_of(&args, "tf-output"),
            data_set,
            list_data: args.is_present("list-data"),
        })
    }

    pub fn vcfg_path(&self) -> PathBuf {
        match &self.vcfg_override_file {
            Some(p) => p.clone(),
            None => self.data_set.vcfg_path(&self.vcfg_dir),
        }
    }

    pub fn volume_path(&self) -> PathBuf {
        match &self.volume_override_file {
            Some(p) => p.clone(),
            None => self.data_set.input_path(&self.data_dir),
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.render_width as f32 / self.render_height as f32
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::args::get_command;
    use std::path::Path;

    fn config_of(args: &[&str]) -> Config {
        let mut argv = vec!["vol_eval"];
        argv.extend_from_slice(args);
        let matches = get_command().try_get_matches_from(argv).unwrap();
        Config::from_args(matches).unwrap()
    }

    #[test]
    fn defaults() {
        let cfg = config_of(&[]);

        assert!(!cfg.verbose);
        assert_eq!((cfg.render_width, cfg.render_height), (1920, 1080));
        assert_eq!(cfg.data_set, DataSet::Azba);
        assert_eq!(cfg.tf_mode, TfMode::Normalized);
        assert_eq!(cfg.results_file, Path::new("./results.csv"));
        assert_eq!(cfg.camera_export_file, Path::new("./camera.cam"));
        assert_eq!(cfg.vcfg_path(), Path::new("./").join("azba.vcfg"));
        assert!(cfg.camera_state_file.is_none());
        assert!(!cfg.list_data);
    }

    #[test]
    fn overrides() {
        let cfg = config_of(&[
            "-d",
            "1",
            "--vcfg-dir",
            "cfg",
            "--data-dir",
            "/data",
            "--tf-mode",
            "native",
            "--camera-state",
            "cam.txt",
            "--camera-state-text",
            "-x",
            "800",
            "-y",
            "400",
        ]);

        assert_eq!(cfg.data_set, DataSet::Cells);
        assert_eq!(cfg.vcfg_path(), Path::new("cfg").join("cells.vcfg"));
        assert_eq!(cfg.volume_path(), Path::new("/data/cells/cells_055.raw"));
        assert_eq!(cfg.tf_mode, TfMode::Native);
        assert_eq!(
            cfg.camera_state_file,
            Some((PathBuf::from("cam.txt"), true))
        );
        assert_eq!(cfg.aspect_ratio(), 2.0);

        let cfg = config_of(&["--vcfg-file", "x.vcfg", "--volume-file", "v.raw"]);
        assert_eq!(cfg.vcfg_path(), Path::new("x.vcfg"));
        assert_eq!(cfg.volume_path(), Path::new("v.raw"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(get_command()
            .try_get_matches_from(["vol_eval", "-d", "9"])
            .is_err());
        assert!(get_command()
            .try_get_matches_from(["vol_eval", "--tf-mode", "log"])
            .is_err());
        assert!(get_command()
            .try_get_matches_from(["vol_eval", "-x", "0"])
            .is_err());
    }
}
