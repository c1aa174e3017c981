use std::{fs::File, io::BufReader, process};

use anyhow::{Context, Result};
use config::Config;
use log::{info, warn};
use segvol_lib::{
    camera::ViewPose,
    eval::{export_results, log_result, read_frame_times_file, summarize},
    scene::RenderSetup,
    segmentation_tf,
    vcfg::{self, VolcaniteParameters},
    volume::LabelVolume,
};

mod args;
mod config;
mod datasets;

use crate::{
    args::get_command,
    datasets::{DATA_SETS, DATA_SET_COUNT},
};

fn init_logger(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn list_data() {
    println!("Available data sets:");
    for (i, ds) in DATA_SETS.iter().enumerate() {
        println!("{i}: {ds}");
    }
    println!();
}

fn load_parameters(cfg: &Config) -> Result<VolcaniteParameters> {
    let vcfg_path = cfg.vcfg_path();
    let mut params = vcfg::read_parameter_file_or_default(&vcfg_path);

    if let Some((path, text)) = &cfg.camera_state_file {
        let file = File::open(path)
            .with_context(|| format!("Cannot open camera state {}", path.display()))?;
        params
            .camera
            .read_from(BufReader::new(file), *text)
            .with_context(|| format!("Cannot read camera state {}", path.display()))?;
        info!("Camera state imported from {}", path.display());
    }

    Ok(params)
}

fn run(cfg: Config) -> Result<()> {
    let mut params = load_parameters(&cfg)?;

    let volume_path = cfg.volume_path();
    let volume = LabelVolume::from_file(&volume_path)
        .with_context(|| format!("Cannot load volume {}", volume_path.display()))?;

    let tf = segmentation_tf(&params, &volume, cfg.tf_mode)
        .context("Cannot build transfer function")?;
    info!(
        "Transfer function with {} opacity and {} color points",
        tf.opacity.len(),
        tf.color.len()
    );
    if let Some(path) = &cfg.tf_output_file {
        tf.save_csv(path)
            .with_context(|| {
                format!("Cannot write transfer function {}", path.display())
            })?;
    }

    let mut setup = RenderSetup::new(&mut params, volume.dims, cfg.aspect_ratio())
        .context("Cannot set up camera")?;
    if let Some(path) = &cfg.camera_import_file {
        let pose = ViewPose::load(path)
            .with_context(|| format!("Cannot import camera {}", path.display()))?;
        setup = setup.with_pose(pose);
        info!("Camera imported from {}", path.display());
    }
    info!(
        "Volume of {}x{}x{} voxels, largest axis {}, view angle {:.2}",
        volume.dims.x, volume.dims.y, volume.dims.z, setup.max_size, setup.pose.view_angle
    );

    let export = &cfg.camera_export_file;
    setup
        .pose
        .save(export)
        .with_context(|| format!("Cannot export camera {}", export.display()))?;

    match &cfg.frame_times_file {
        Some(path) => {
            let times = read_frame_times_file(path)
                .with_context(|| format!("Cannot read frame times {}", path.display()))?;
            let result = summarize(&times)?;
            log_result(&result);
            export_results(cfg.data_set.output_name(), &result, &cfg.results_file)?;
        }
        None => warn!("No frame times given, results not exported"),
    }

    Ok(())
}

pub fn main() {
    let cmd = get_command();
    let args = cmd.get_matches();

    let cfg = match Config::from_args(args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    if cfg.list_data {
        list_data();
        process::exit(DATA_SET_COUNT as i32);
    }

    init_logger(cfg.verbose);
    info!("Evaluating data set {}", cfg.data_set);

    if let Err(e) = run(cfg) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use nalgebra::vector;
    use segvol_lib::{
        test_helpers::{striped_volume, SAMPLE_VCFG},
        volume::SampleWidth,
    };
    use std::fs;

    #[test]
    fn evaluates_data_set() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("data/cells")).unwrap();
        fs::write(root.join("cells.vcfg"), SAMPLE_VCFG).unwrap();
        fs::write(root.join("times.txt"), "10\n12\n14\n").unwrap();

        let volume = striped_volume(vector![6, 5, 4]);
        let file = File::create(root.join("data/cells/cells_055.raw")).unwrap();
        volume.write_to(file, SampleWidth::U16).unwrap();

        let root_arg = |p: &str| root.join(p).into_os_string();
        let argv = vec![
            "vol_eval".into(),
            "-d".into(),
            "1".into(),
            "--data-dir".into(),
            root_arg("data"),
            "--vcfg-dir".into(),
            root.as_os_str().to_owned(),
            "--frame-times".into(),
            root_arg("times.txt"),
            "--results-file".into(),
            root_arg("out/results.csv"),
            "--camera-export".into(),
            root_arg("out/camera.cam"),
            "--tf-output".into(),
            root_arg("tf.csv"),
        ];
        let matches = get_command().try_get_matches_from(argv).unwrap();
        let cfg = Config::from_args(matches).unwrap();

        run(cfg).unwrap();

        let results = fs::read_to_string(root.join("out/results.csv")).unwrap();
        let row = results.lines().nth(1).unwrap();
        assert!(row.starts_with("cells,10,12,14,"));
        assert!(ViewPose::load(root.join("out/camera.cam")).is_ok());
        assert!(fs::read_to_string(root.join("tf.csv"))
            .unwrap()
            .starts_with("kind,x,opacity,h,s,v"));
    }

    #[test]
    fn missing_volume_fails() {
        let dir = tempfile::tempdir().unwrap();
        let argv = vec![
            "vol_eval".into(),
            "--data-dir".into(),
            dir.path().as_os_str().to_owned(),
            "--vcfg-dir".into(),
            dir.path().as_os_str().to_owned(),
        ];
        let matches = get_command()
            .try_get_matches_from::<_, std::ffi::OsString>(argv)
            .unwrap();
        let cfg = Config::from_args(matches).unwrap();

        let err = run(cfg).unwrap_err();
        assert!(format!("{err:#}").contains("Cannot load volume"));
    }
}
