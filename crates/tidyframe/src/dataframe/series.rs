use std::sync::Arc;

use arrow::array::{
    new_null_array, Array, ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array,
    StringArray,
};
use chrono::{NaiveDate, NaiveDateTime};

use crate::expr::{AggFunc, FillStrategy};
use crate::physical::kernels::{
    self, aggregate::aggregate, as_boolean, as_date32, as_float64, as_int64, as_utf8, ticks,
    window,
};
use crate::types::{cast_array, date_to_days, datetime_to_ticks, DType, Scalar, TimeUnit};
use crate::{DataFrameError, Result};

/// A named, typed, immutable column backed by one Arrow array.
///
/// The array's Arrow type is always `dtype.to_arrow()`; other Arrow widths are
/// normalized on construction.
#[derive(Debug, Clone)]
pub struct Series {
    name: String,
    array: ArrayRef,
    dtype: DType,
}

impl PartialEq for Series {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.dtype == other.dtype && self.array.as_ref() == other.array.as_ref()
    }
}

impl Series {
    /// Construct a `Series` from an Arrow array, normalizing its type.
    pub fn from_arrow(name: &str, array: ArrayRef) -> Result<Self> {
        let dtype = DType::from_arrow(array.data_type()).map_err(|err| match err {
            DataFrameError::TypeMismatch {
                expected, actual, ..
            } => DataFrameError::type_mismatch(Some(name.to_string()), expected, actual),
            other => other,
        })?;
        let target = dtype.to_arrow();
        let array = if array.data_type() == &target {
            array
        } else {
            arrow::compute::cast(array.as_ref(), &target)
                .map_err(|source| DataFrameError::Arrow { source })?
        };
        Ok(Self::from_normalized(name, array, dtype))
    }

    /// Construct a `Series` from Arrow chunks, validating that all chunks share the same dtype.
    pub fn from_chunks(name: &str, chunks: Vec<ArrayRef>) -> Result<Self> {
        let mut parts = chunks
            .into_iter()
            .map(|chunk| Self::from_arrow(name, chunk))
            .collect::<Result<Vec<_>>>()?;
        if parts.is_empty() {
            return Ok(Self::nulls(name, 0));
        }
        let expected = parts[0].dtype;
        for part in &parts[1..] {
            if part.dtype != expected {
                return Err(DataFrameError::type_mismatch(
                    Some(name.to_string()),
                    expected.to_string(),
                    part.dtype.to_string(),
                ));
            }
        }
        if parts.len() == 1 {
            return Ok(parts.remove(0));
        }
        let refs: Vec<&dyn Array> = parts.iter().map(|p| p.array.as_ref()).collect();
        let array =
            arrow::compute::concat(&refs).map_err(|source| DataFrameError::Arrow { source })?;
        Ok(Self::from_normalized(name, array, expected))
    }

    /// Construct a `Series` from scalar values; the dtype is their supertype.
    pub fn from_values(name: &str, values: &[Scalar]) -> Result<Self> {
        let arrays: Vec<ArrayRef> = values.iter().map(|v| v.to_array(1)).collect();
        let array = kernels::concat_unified(&arrays)?;
        Self::from_arrow(name, array)
    }

    pub fn int64<V: Into<Option<i64>>>(name: &str, values: impl IntoIterator<Item = V>) -> Self {
        let array: Int64Array = values.into_iter().map(Into::into).collect();
        Self::from_normalized(name, Arc::new(array), DType::Int64)
    }

    pub fn float64<V: Into<Option<f64>>>(name: &str, values: impl IntoIterator<Item = V>) -> Self {
        let array: Float64Array = values.into_iter().map(Into::into).collect();
        Self::from_normalized(name, Arc::new(array), DType::Float64)
    }

    pub fn boolean<V: Into<Option<bool>>>(name: &str, values: impl IntoIterator<Item = V>) -> Self {
        let array: BooleanArray = values.into_iter().map(Into::into).collect();
        Self::from_normalized(name, Arc::new(array), DType::Boolean)
    }

    pub fn utf8<'a, V: Into<Option<&'a str>>>(
        name: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let array: StringArray = values.into_iter().map(Into::into).collect();
        Self::from_normalized(name, Arc::new(array), DType::Utf8)
    }

    pub fn date<V: Into<Option<NaiveDate>>>(name: &str, values: impl IntoIterator<Item = V>) -> Self {
        let array: Date32Array = values
            .into_iter()
            .map(|v| v.into().map(date_to_days))
            .collect();
        Self::from_normalized(name, Arc::new(array), DType::Date)
    }

    /// Microsecond datetimes.
    pub fn datetime<V: Into<Option<NaiveDateTime>>>(
        name: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let unit = TimeUnit::Microsecond;
        let array = kernels::datetime_array(
            values
                .into_iter()
                .map(|v| v.into().map(|dt| datetime_to_ticks(dt, unit))),
            unit,
        );
        Self::from_normalized(name, array, DType::Datetime(unit))
    }

    /// An all-null column of dtype `Null`.
    pub fn nulls(name: &str, len: usize) -> Self {
        Self::from_normalized(name, new_null_array(&DType::Null.to_arrow(), len), DType::Null)
    }

    /// Wrap an array already in normalized form.
    pub(crate) fn from_normalized(name: &str, array: ArrayRef, dtype: DType) -> Self {
        Self {
            name: name.to_string(),
            array,
            dtype,
        }
    }

    /// Build from a kernel output, whose type is normalized by construction.
    pub(crate) fn from_kernel(name: &str, array: ArrayRef) -> Result<Self> {
        let dtype = kernels::dtype_of(array.as_ref())?;
        Ok(Self::from_normalized(name, array, dtype))
    }

    /// Return the series name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Return the logical length of the series.
    pub fn len(&self) -> usize {
        self.array.len()
    }

    /// Returns `true` if this series is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn null_count(&self) -> usize {
        kernels::null_mask(self.array.as_ref())
            .into_iter()
            .filter(|n| *n)
            .count()
    }

    pub fn array(&self) -> &ArrayRef {
        &self.array
    }

    /// Convert this series into an Arrow array.
    pub fn to_arrow(&self) -> ArrayRef {
        self.array.clone()
    }

    /// Same values under a new name.
    pub fn with_name(&self, name: &str) -> Series {
        Self::from_normalized(name, self.array.clone(), self.dtype)
    }

    /// Value at row `index`.
    pub fn get(&self, index: usize) -> Result<Scalar> {
        if index >= self.len() {
            return Err(DataFrameError::invalid_argument(format!(
                "row {index} out of range for column '{}' of length {}",
                self.name,
                self.len()
            )));
        }
        scalar_at(&self.array, index)
    }

    /// Iterate values as scalars.
    pub fn iter(&self) -> impl Iterator<Item = Scalar> + '_ {
        (0..self.len()).map(|i| scalar_at(&self.array, i).unwrap_or(Scalar::Null))
    }

    fn expect_dtype(&self, expected: DType) -> Result<()> {
        if self.dtype == expected || self.dtype == DType::Null {
            Ok(())
        } else {
            Err(DataFrameError::type_mismatch(
                Some(self.name.clone()),
                expected.to_string(),
                self.dtype.to_string(),
            ))
        }
    }

    pub fn i64_values(&self) -> Result<Vec<Option<i64>>> {
        self.expect_dtype(DType::Int64)?;
        if self.dtype == DType::Null {
            return Ok(vec![None; self.len()]);
        }
        Ok(as_int64(self.array.as_ref())?.iter().collect())
    }

    /// Numeric values as `f64` (`Int64`, `Float64` and `Boolean` columns).
    pub fn f64_values(&self) -> Result<Vec<Option<f64>>> {
        kernels::f64_values(self.array.as_ref()).map_err(|_| {
            DataFrameError::type_mismatch(Some(self.name.clone()), "numeric", self.dtype.to_string())
        })
    }

    pub fn bool_values(&self) -> Result<Vec<Option<bool>>> {
        self.expect_dtype(DType::Boolean)?;
        if self.dtype == DType::Null {
            return Ok(vec![None; self.len()]);
        }
        Ok(as_boolean(self.array.as_ref())?.iter().collect())
    }

    pub fn str_values(&self) -> Result<Vec<Option<String>>> {
        self.expect_dtype(DType::Utf8)?;
        if self.dtype == DType::Null {
            return Ok(vec![None; self.len()]);
        }
        Ok(as_utf8(self.array.as_ref())?
            .iter()
            .map(|v| v.map(str::to_string))
            .collect())
    }

    pub fn cast(&self, dtype: DType) -> Result<Series> {
        let array = cast_array(&self.array, dtype)?;
        Ok(Self::from_normalized(&self.name, array, dtype))
    }

    /// Gather rows by position.
    pub fn take(&self, indices: &[usize]) -> Result<Series> {
        let array = kernels::take(&self.array, indices)?;
        Ok(Self::from_normalized(&self.name, array, self.dtype))
    }

    /// Zero-copy slice of `len` rows starting at `offset`.
    pub fn slice(&self, offset: usize, len: usize) -> Series {
        let offset = offset.min(self.len());
        let len = len.min(self.len() - offset);
        Self::from_normalized(&self.name, self.array.slice(offset, len), self.dtype)
    }

    /// Keep rows where `mask` is true; null mask slots drop the row.
    pub fn filter(&self, mask: &BooleanArray) -> Result<Series> {
        let array = if self.dtype == DType::Null {
            let kept = mask.iter().filter(|v| *v == Some(true)).count();
            new_null_array(&DType::Null.to_arrow(), kept)
        } else {
            arrow::compute::filter(self.array.as_ref(), mask)
                .map_err(|source| DataFrameError::Arrow { source })?
        };
        Ok(Self::from_normalized(&self.name, array, self.dtype))
    }

    /// Concatenate `other` below this series, promoting to the common dtype.
    pub fn append(&self, other: &Series) -> Result<Series> {
        let array = kernels::concat_unified(&[self.array.clone(), other.array.clone()])
            .map_err(|err| self.with_column_context(err))?;
        Self::from_kernel(&self.name, array)
    }

    fn with_column_context(&self, err: DataFrameError) -> DataFrameError {
        match err {
            DataFrameError::TypeMismatch {
                column: None,
                expected,
                actual,
            } => DataFrameError::type_mismatch(Some(self.name.clone()), expected, actual),
            other => other,
        }
    }

    fn reduce(&self, func: AggFunc) -> Result<Scalar> {
        let out = aggregate(func, &self.array).map_err(|err| self.with_column_context(err))?;
        scalar_at(&out, 0)
    }

    pub fn sum(&self) -> Result<Scalar> {
        self.reduce(AggFunc::Sum)
    }

    pub fn mean(&self) -> Result<Scalar> {
        self.reduce(AggFunc::Mean)
    }

    pub fn median(&self) -> Result<Scalar> {
        self.reduce(AggFunc::Median)
    }

    pub fn min(&self) -> Result<Scalar> {
        self.reduce(AggFunc::Min)
    }

    pub fn max(&self) -> Result<Scalar> {
        self.reduce(AggFunc::Max)
    }

    /// Sample standard deviation.
    pub fn sd(&self) -> Result<Scalar> {
        self.reduce(AggFunc::Std)
    }

    /// Sample variance.
    pub fn var(&self) -> Result<Scalar> {
        self.reduce(AggFunc::Var)
    }

    /// Number of non-null values.
    pub fn count(&self) -> usize {
        self.len() - self.null_count()
    }

    pub fn n_distinct(&self) -> Result<usize> {
        let n = self.reduce(AggFunc::NUnique)?;
        Ok(n.as_i64().map_or(0, |v| v as usize))
    }

    pub fn quantile(&self, p: f64) -> Result<Scalar> {
        self.reduce(AggFunc::Quantile(p))
    }

    /// Shift by `offset` rows: positive lags, negative leads.
    pub fn shift(&self, offset: i64, default: Option<&Scalar>) -> Result<Series> {
        let array = window::shift(&self.array, offset, default)?;
        Self::from_kernel(&self.name, array)
    }

    pub fn fill_null(&self, strategy: FillStrategy) -> Result<Series> {
        let array = window::fill_null(&self.array, strategy)?;
        Ok(Self::from_normalized(&self.name, array, self.dtype))
    }

    /// Replace nulls with `value`, promoting to the common dtype.
    pub fn fill_null_with(&self, value: &Scalar) -> Result<Series> {
        let fill = value.to_array(1);
        let indices: Vec<(usize, usize)> = kernels::null_mask(self.array.as_ref())
            .into_iter()
            .enumerate()
            .map(|(row, null)| if null { (1, 0) } else { (0, row) })
            .collect();
        let array = kernels::interleave(&[self.array.clone(), fill], &indices)
            .map_err(|err| self.with_column_context(err))?;
        Self::from_kernel(&self.name, array)
    }
}

/// Value of one cell as a [`Scalar`].
pub(crate) fn scalar_at(array: &ArrayRef, index: usize) -> Result<Scalar> {
    if array.is_null(index) || array.data_type() == &DType::Null.to_arrow() {
        return Ok(Scalar::Null);
    }
    let value = match kernels::dtype_of(array.as_ref())? {
        DType::Null => Scalar::Null,
        DType::Boolean => Scalar::Boolean(as_boolean(array.as_ref())?.value(index)),
        DType::Int64 => Scalar::Int64(as_int64(array.as_ref())?.value(index)),
        DType::Float64 => Scalar::Float64(as_float64(array.as_ref())?.value(index)),
        DType::Utf8 => Scalar::Utf8(as_utf8(array.as_ref())?.value(index).to_string()),
        DType::Date => Scalar::Date(as_date32(array.as_ref())?.value(index)),
        DType::Datetime(_) => {
            let single = array.slice(index, 1);
            let (values, unit) = ticks(single.as_ref())?;
            match values.first().copied().flatten() {
                Some(v) => Scalar::Datetime(v, unit),
                None => Scalar::Null,
            }
        }
    };
    Ok(value)
}
