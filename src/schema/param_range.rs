use std::ops::Range;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, StructArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Fields};

use crate::container::{downcast, ColumnValue, ContainerError};

const CV_START: &str = "cv_start";
const CV_END: &str = "cv_end";
const USER_START: &str = "user_start";
const USER_END: &str = "user_end";
const REF_START: &str = "ref_start";
const REF_END: &str = "ref_end";

/// A parameter list stored as three half-open ranges into the `CVParam`,
/// `UserParam` and `RefParam` arenas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ParamRange {
    /// First CV parameter
    pub cv_start: u32,
    /// One past the last CV parameter
    pub cv_end: u32,
    /// First user parameter
    pub user_start: u32,
    /// One past the last user parameter
    pub user_end: u32,
    /// First parameter group reference
    pub ref_start: u32,
    /// One past the last parameter group reference
    pub ref_end: u32,
}

impl ParamRange {
    /// Range into the CV parameter arena
    pub fn cv(&self) -> Range<usize> {
        self.cv_start as usize..self.cv_end as usize
    }

    /// Range into the user parameter arena
    pub fn user(&self) -> Range<usize> {
        self.user_start as usize..self.user_end as usize
    }

    /// Range into the parameter group reference arena
    pub fn refs(&self) -> Range<usize> {
        self.ref_start as usize..self.ref_end as usize
    }

    /// Whether all three ranges are empty
    pub fn is_empty(&self) -> bool {
        self.cv_start >= self.cv_end
            && self.user_start >= self.user_end
            && self.ref_start >= self.ref_end
    }
}

fn fields() -> Fields {
    [CV_START, CV_END, USER_START, USER_END, REF_START, REF_END]
        .into_iter()
        .map(|name| Field::new(name, DataType::UInt32, false))
        .collect::<Vec<_>>()
        .into()
}

fn part<'a>(array: &'a StructArray, column: &str, name: &str) -> Result<&'a [u32], ContainerError> {
    let child = array
        .column_by_name(name)
        .ok_or_else(|| ContainerError::ColumnNotFound(format!("{}.{}", column, name)))?;
    Ok(downcast::<UInt32Array>(child, name)?.values())
}

impl ColumnValue for ParamRange {
    fn data_type() -> DataType {
        DataType::Struct(fields())
    }

    fn to_array(values: Vec<Self>) -> ArrayRef {
        let column = |get: fn(&ParamRange) -> u32| -> ArrayRef {
            Arc::new(UInt32Array::from_iter_values(values.iter().map(get)))
        };
        let columns = vec![
            column(|r| r.cv_start),
            column(|r| r.cv_end),
            column(|r| r.user_start),
            column(|r| r.user_end),
            column(|r| r.ref_start),
            column(|r| r.ref_end),
        ];
        Arc::new(StructArray::new(fields(), columns, None))
    }

    fn from_array(array: &ArrayRef, column: &str) -> Result<Vec<Self>, ContainerError> {
        let ranges = downcast::<StructArray>(array, column)?;
        let cv_start = part(ranges, column, CV_START)?;
        let cv_end = part(ranges, column, CV_END)?;
        let user_start = part(ranges, column, USER_START)?;
        let user_end = part(ranges, column, USER_END)?;
        let ref_start = part(ranges, column, REF_START)?;
        let ref_end = part(ranges, column, REF_END)?;

        Ok((0..ranges.len())
            .map(|i| ParamRange {
                cv_start: cv_start[i],
                cv_end: cv_end[i],
                user_start: user_start[i],
                user_end: user_end[i],
                ref_start: ref_start[i],
                ref_end: ref_end[i],
            })
            .collect())
    }
}
