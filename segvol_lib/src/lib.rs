pub mod camera;
pub mod color;
pub mod common;
pub mod eval;
pub mod scene;
pub mod test_helpers;
pub mod transfer_function;
pub mod vcfg;
pub mod volume;

use common::merge_intervals;
use transfer_function::{TfMode, TransferFunction, TransferFunctionError};
use vcfg::VolcaniteParameters;
use volume::LabelVolume;

/// Transfer function of the materials visible in `params`, for the labels present in `volume`.
pub fn segmentation_tf(
    params: &VolcaniteParameters,
    volume: &LabelVolume,
    mode: TfMode,
) -> Result<TransferFunction, TransferFunctionError> {
    let intervals = merge_intervals(params.visible_intervals());
    for i in &intervals {
        log::debug!("  [{},{}]", i.start, i.end);
    }

    let labels = volume.label_range();
    log::debug!("volume labels: [{},{}]", labels.low, labels.high);

    TransferFunction::build(&intervals, labels, mode)
}
