//! Typed elements stored in datasets.
//!
//! Every dataset is a Parquet file holding a sequence of one element type.
//! Primitive datasets (`u32`, `f32`, `f64`) use a single `value` column;
//! record tables are declared with the [`record!`](crate::record) macro, which
//! derives a flat column layout from the struct fields.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int32Array, StringArray,
    UInt16Array, UInt32Array, UInt64Array,
};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;

use super::ContainerError;
use crate::config::ElementType;

/// Column name of primitive datasets
pub const VALUE_COLUMN: &str = "value";

/// An element type that can be stored in a dataset
pub trait Element: Clone + Send + Sized + 'static {
    /// Element type registered in the configuration for datasets of this type
    const ELEMENT_TYPE: ElementType;

    /// Arrow schema of the dataset
    fn schema() -> SchemaRef;

    /// Encode elements into a record batch
    fn to_batch(items: &[Self]) -> Result<RecordBatch, ArrowError>;

    /// Decode elements from a record batch
    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>, ContainerError>;

    /// Columns that hold floating point data
    fn float_columns() -> &'static [&'static str] {
        &[]
    }

    /// Whether a dataset registered as `stored` can be decoded into `Self`
    fn accepts(stored: ElementType) -> bool {
        stored == Self::ELEMENT_TYPE
    }
}

/// A value type that maps onto one Arrow column
pub trait ColumnValue: Sized {
    /// Arrow data type of the column
    fn data_type() -> DataType;

    /// Whether the column may hold nulls
    fn nullable() -> bool {
        false
    }

    /// Build an array from owned values
    fn to_array(values: Vec<Self>) -> ArrayRef;

    /// Decode an array
    fn from_array(array: &ArrayRef, column: &str) -> Result<Vec<Self>, ContainerError>;
}

/// Get a required column by name.
pub fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef, ContainerError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| ContainerError::ColumnNotFound(name.to_string()))
}

/// Downcast a column to a concrete array type.
pub fn downcast<'a, A: Array + 'static>(
    array: &'a ArrayRef,
    column: &str,
) -> Result<&'a A, ContainerError> {
    array.as_any().downcast_ref::<A>().ok_or_else(|| {
        ContainerError::InvalidFormat(format!(
            "column {} has unexpected type {}",
            column,
            array.data_type()
        ))
    })
}

macro_rules! primitive_column {
    ($ty:ty, $array:ty, $data_type:expr) => {
        impl ColumnValue for $ty {
            fn data_type() -> DataType {
                $data_type
            }

            fn to_array(values: Vec<Self>) -> ArrayRef {
                Arc::new(<$array>::from(values))
            }

            fn from_array(array: &ArrayRef, column: &str) -> Result<Vec<Self>, ContainerError> {
                Ok(downcast::<$array>(array, column)?.values().to_vec())
            }
        }
    };
}

primitive_column!(u16, UInt16Array, DataType::UInt16);
primitive_column!(u32, UInt32Array, DataType::UInt32);
primitive_column!(u64, UInt64Array, DataType::UInt64);
primitive_column!(i32, Int32Array, DataType::Int32);
primitive_column!(f32, Float32Array, DataType::Float32);

impl ColumnValue for f64 {
    fn data_type() -> DataType {
        DataType::Float64
    }

    fn to_array(values: Vec<Self>) -> ArrayRef {
        Arc::new(Float64Array::from(values))
    }

    /// Single precision columns are widened.
    fn from_array(array: &ArrayRef, column: &str) -> Result<Vec<Self>, ContainerError> {
        if let Some(values) = array.as_any().downcast_ref::<Float32Array>() {
            return Ok(values.values().iter().map(|v| *v as f64).collect());
        }
        Ok(downcast::<Float64Array>(array, column)?.values().to_vec())
    }
}

impl ColumnValue for bool {
    fn data_type() -> DataType {
        DataType::Boolean
    }

    fn to_array(values: Vec<Self>) -> ArrayRef {
        Arc::new(BooleanArray::from(values))
    }

    fn from_array(array: &ArrayRef, column: &str) -> Result<Vec<Self>, ContainerError> {
        Ok(downcast::<BooleanArray>(array, column)?
            .iter()
            .map(|v| v.unwrap_or(false))
            .collect())
    }
}

impl ColumnValue for String {
    fn data_type() -> DataType {
        DataType::Utf8
    }

    fn to_array(values: Vec<Self>) -> ArrayRef {
        Arc::new(StringArray::from(values))
    }

    fn from_array(array: &ArrayRef, column: &str) -> Result<Vec<Self>, ContainerError> {
        Ok(downcast::<StringArray>(array, column)?
            .iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect())
    }
}

impl ColumnValue for Option<String> {
    fn data_type() -> DataType {
        DataType::Utf8
    }

    fn nullable() -> bool {
        true
    }

    fn to_array(values: Vec<Self>) -> ArrayRef {
        Arc::new(StringArray::from(values))
    }

    fn from_array(array: &ArrayRef, column: &str) -> Result<Vec<Self>, ContainerError> {
        Ok(downcast::<StringArray>(array, column)?
            .iter()
            .map(|v| v.map(str::to_string))
            .collect())
    }
}

macro_rules! primitive_element {
    ($ty:ty, $element_type:expr, $floats:expr, $($accepted:pat_param)|+) => {
        impl Element for $ty {
            const ELEMENT_TYPE: ElementType = $element_type;

            fn schema() -> SchemaRef {
                Arc::new(Schema::new(vec![Field::new(
                    VALUE_COLUMN,
                    <$ty as ColumnValue>::data_type(),
                    false,
                )]))
            }

            fn to_batch(items: &[Self]) -> Result<RecordBatch, ArrowError> {
                RecordBatch::try_new(
                    Self::schema(),
                    vec![<$ty as ColumnValue>::to_array(items.to_vec())],
                )
            }

            fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>, ContainerError> {
                <$ty as ColumnValue>::from_array(column(batch, VALUE_COLUMN)?, VALUE_COLUMN)
            }

            fn float_columns() -> &'static [&'static str] {
                $floats
            }

            fn accepts(stored: ElementType) -> bool {
                matches!(stored, $($accepted)|+)
            }
        }
    };
}

primitive_element!(u32, ElementType::UInt32, &[], ElementType::UInt32);
primitive_element!(i32, ElementType::Int32, &[], ElementType::Int32);
primitive_element!(f32, ElementType::Float32, &[VALUE_COLUMN], ElementType::Float32);
primitive_element!(
    f64,
    ElementType::Float64,
    &[VALUE_COLUMN],
    ElementType::Float64 | ElementType::Float32
);

/// Declare a record table: the struct, and an [`Element`] implementation
/// with one column per field.
///
/// Field types must implement [`ColumnValue`]. A field may name its default
/// value with `= expr`; other fields default to `Default::default()`.
#[macro_export]
macro_rules! record {
    (@default) => {
        ::std::default::Default::default()
    };
    (@default $value:expr) => {
        $value
    };
    (
        $(#[$meta:meta])*
        pub struct $name:ident as $layout:literal {
            $( $(#[$field_meta:meta])* pub $field:ident : $field_ty:ty $(= $default:expr)? ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            $( $(#[$field_meta])* pub $field: $field_ty, )*
        }

        impl ::std::default::Default for $name {
            fn default() -> Self {
                Self {
                    $( $field: $crate::record!(@default $($default)?), )*
                }
            }
        }

        impl $crate::container::Element for $name {
            const ELEMENT_TYPE: $crate::config::ElementType =
                $crate::config::ElementType::Compound($layout);

            fn schema() -> ::arrow::datatypes::SchemaRef {
                ::std::sync::Arc::new(::arrow::datatypes::Schema::new(vec![
                    $(
                        ::arrow::datatypes::Field::new(
                            stringify!($field),
                            <$field_ty as $crate::container::ColumnValue>::data_type(),
                            <$field_ty as $crate::container::ColumnValue>::nullable(),
                        ),
                    )*
                ]))
            }

            fn to_batch(
                items: &[Self],
            ) -> ::std::result::Result<::arrow::record_batch::RecordBatch, ::arrow::error::ArrowError> {
                let columns: ::std::vec::Vec<::arrow::array::ArrayRef> = vec![
                    $(
                        <$field_ty as $crate::container::ColumnValue>::to_array(
                            items.iter().map(|item| item.$field.clone()).collect(),
                        ),
                    )*
                ];
                ::arrow::record_batch::RecordBatch::try_new(Self::schema(), columns)
            }

            fn from_batch(
                batch: &::arrow::record_batch::RecordBatch,
            ) -> ::std::result::Result<::std::vec::Vec<Self>, $crate::container::ContainerError> {
                let rows = batch.num_rows();
                $(
                    let mut $field = <$field_ty as $crate::container::ColumnValue>::from_array(
                        $crate::container::column(batch, stringify!($field))?,
                        stringify!($field),
                    )?
                    .into_iter();
                )*
                let mut records = ::std::vec::Vec::with_capacity(rows);
                for _ in 0..rows {
                    records.push(Self {
                        $(
                            $field: $field.next().ok_or_else(|| {
                                $crate::container::ContainerError::InvalidFormat(format!(
                                    "column {} is shorter than its batch",
                                    stringify!($field)
                                ))
                            })?,
                        )*
                    });
                }
                Ok(records)
            }
        }
    };
}
