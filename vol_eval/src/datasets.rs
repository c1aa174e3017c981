use std::{fmt, path::Path, path::PathBuf};

pub const DATA_SET_COUNT: usize = 9;

/// Evaluated segmentation volumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSet {
    Azba,
    Cells,
    Fiber,
    Motta2019Small,
    Pa66,
    Wolny2020,
    XtmBattery,
    Ara2016,
    Griesser2022Validation,
}

pub const DATA_SETS: [DataSet; DATA_SET_COUNT] = [
    DataSet::Azba,
    DataSet::Cells,
    DataSet::Fiber,
    DataSet::Motta2019Small,
    DataSet::Pa66,
    DataSet::Wolny2020,
    DataSet::XtmBattery,
    DataSet::Ara2016,
    DataSet::Griesser2022Validation,
];

impl DataSet {
    pub fn from_index(index: usize) -> Option<DataSet> {
        DATA_SETS.get(index).copied()
    }

    /// Name used for parameter files and result rows
    pub fn output_name(&self) -> &'static str {
        match self {
            DataSet::Azba => "azba",
            DataSet::Cells => "cells",
            DataSet::Fiber => "fiber",
            DataSet::Motta2019Small => "Motta2019-small",
            DataSet::Pa66 => "pa66",
            DataSet::Wolny2020 => "Wolny2020",
            DataSet::XtmBattery => "xtm-battery",
            DataSet::Ara2016 => "Ara2016",
            DataSet::Griesser2022Validation => "Griesser2022-validation",
        }
    }

    /// Volume file relative to the data directory
    pub fn input_postfix(&self) -> &'static str {
        match self {
            DataSet::Azba => "azba/azba.raw",
            DataSet::Cells => "cells/cells_055.raw",
            DataSet::Fiber => "fiber/maurer_glassfiberpolymer.raw",
            DataSet::Motta2019Small => "Motta2019-small/Motta2019_x2y3z2.raw",
            DataSet::Pa66 => "pa66/pa66_segm.raw",
            DataSet::Wolny2020 => "Wolny2020/Wolny2020.raw",
            DataSet::XtmBattery => "xtm-battery/xtm-battery.raw",
            DataSet::Ara2016 => "Ara2016/Ara2016_full.raw",
            DataSet::Griesser2022Validation => {
                "Griesser2022-validation/Griesser2022-validation_full.raw"
            }
        }
    }

    pub fn input_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(self.input_postfix())
    }

    pub fn vcfg_path(&self, vcfg_dir: &Path) -> PathBuf {
        vcfg_dir.join(format!("{}.vcfg", self.output_name()))
    }
}

impl fmt::Display for DataSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.output_name())
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn indices() {
        assert_eq!(DataSet::from_index(0), Some(DataSet::Azba));
        assert_eq!(DataSet::from_index(3), Some(DataSet::Motta2019Small));
        assert_eq!(
            DataSet::from_index(8),
            Some(DataSet::Griesser2022Validation)
        );
        assert_eq!(DataSet::from_index(DATA_SET_COUNT), None);
    }

    #[test]
    fn paths() {
        let ds = DataSet::XtmBattery;
        assert_eq!(
            ds.vcfg_path(Path::new("cfg")),
            Path::new("cfg").join("xtm-battery.vcfg")
        );
        assert_eq!(
            ds.input_path(Path::new("/data")),
            Path::new("/data/xtm-battery/xtm-battery.raw")
        );
    }
}
