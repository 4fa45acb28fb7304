// src/eurostat/structure.rs

use crate::error::FormatError;
use crate::eurostat::clean::number_text;
use crate::table::batch_from_columns;
use anyhow::Result;
use arrow::{
    array::{new_empty_array, Array, ArrayRef, Float64Array, StringArray},
    compute::{cast, concat},
    datatypes::DataType,
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::debug;

/// Joins the final identifier dimension and the time axis in a header name,
/// as in `geo\time`.
pub const COMPOUND_SEPARATOR: char = '\\';

/// Name of the melted value column.
pub const VALUE_COLUMN: &str = "value";

/// Melt a wide table (one column per period) into long form.
///
/// Everything up to and including the `<id>\<time>` column is kept as
/// identifiers (that column renamed to `<id>`); every later column becomes
/// one block of rows tagged with its header in a `<time>` column, with the
/// cell in `value`. Blocks follow the original column order and rows keep
/// their input order within each block.
pub fn structure(batch: &RecordBatch) -> Result<RecordBatch> {
    let names: Vec<&str> = batch
        .schema_ref()
        .fields()
        .iter()
        .map(|f| f.name().as_str())
        .collect();

    // 1) Locate the rightmost identifier column
    let compound: Vec<usize> = names
        .iter()
        .enumerate()
        .filter(|(_, name)| name.contains(COMPOUND_SEPARATOR))
        .map(|(i, _)| i)
        .collect();
    if compound.len() != 1 {
        return Err(FormatError::IdentifierBoundary {
            found: compound.len(),
        }
        .into());
    }
    let last_id = compound[0];

    // 2) Split it into the identifier name and the time-axis name
    let (id_name, var_name) = names[last_id]
        .split_once(COMPOUND_SEPARATOR)
        .filter(|(_, var)| !var.contains(COMPOUND_SEPARATOR))
        .ok_or_else(|| FormatError::CompoundName {
            name: names[last_id].to_string(),
        })?;

    let mut out_names: Vec<String> = names[..last_id].iter().map(|n| n.to_string()).collect();
    out_names.push(id_name.to_string());
    out_names.push(var_name.to_string());
    out_names.push(VALUE_COLUMN.to_string());

    // 3) Melt
    let periods = &names[last_id + 1..];
    let value_cols = &batch.columns()[last_id + 1..];
    let num_rows = batch.num_rows();

    let mut columns = Vec::with_capacity(out_names.len());
    for col in &batch.columns()[..=last_id] {
        columns.push(repeat_column(col, periods.len())?);
    }
    let period_labels: StringArray = periods
        .iter()
        .flat_map(|p| std::iter::repeat(Some(*p)).take(num_rows))
        .collect();
    columns.push(Arc::new(period_labels) as ArrayRef);
    columns.push(stack_values(value_cols)?);

    debug!(
        identifiers = last_id + 1,
        periods = periods.len(),
        rows = num_rows * periods.len(),
        "structured table"
    );
    batch_from_columns(&out_names, columns, num_rows * periods.len())
}

fn repeat_column(col: &ArrayRef, times: usize) -> Result<ArrayRef> {
    if times == 0 {
        return Ok(new_empty_array(col.data_type()));
    }
    let parts: Vec<&dyn Array> = std::iter::repeat(col.as_ref()).take(times).collect();
    Ok(concat(&parts)?)
}

/// Stack the period columns end to end. Columns of differing types (an
/// uncleaned table) are stacked as text.
fn stack_values(cols: &[ArrayRef]) -> Result<ArrayRef> {
    let Some(first) = cols.first() else {
        return Ok(new_empty_array(&DataType::Float64));
    };
    if cols.iter().all(|c| c.data_type() == first.data_type()) {
        let parts: Vec<&dyn Array> = cols.iter().map(|c| c.as_ref()).collect();
        return Ok(concat(&parts)?);
    }
    let as_text = cols.iter().map(text_column).collect::<Result<Vec<_>>>()?;
    let parts: Vec<&dyn Array> = as_text.iter().map(|c| c.as_ref()).collect();
    Ok(concat(&parts)?)
}

/// Floats are written the way the cleaner writes numerals in text columns.
fn text_column(col: &ArrayRef) -> Result<ArrayRef> {
    match col.as_any().downcast_ref::<Float64Array>() {
        Some(floats) => {
            let text: StringArray = floats.iter().map(|v| v.map(number_text)).collect();
            Ok(Arc::new(text) as ArrayRef)
        }
        None => Ok(cast(col.as_ref(), &DataType::Utf8)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eurostat::clean::clean_data;
    use crate::eurostat::raw::parse_raw;
    use crate::eurostat::tests::SAMPLE_TSV;
    use arrow::datatypes::{Field, Schema};
    use std::io::Cursor;

    fn sample_clean() -> Result<RecordBatch> {
        clean_data(&parse_raw(Cursor::new(SAMPLE_TSV))?)
    }

    fn strings(batch: &RecordBatch, name: &str) -> Vec<String> {
        batch
            .column_by_name(name)
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap()
            .iter()
            .map(|v| v.unwrap().to_string())
            .collect()
    }

    fn renamed(batch: &RecordBatch, idx: usize, name: &str) -> Result<RecordBatch> {
        let fields: Vec<Field> = batch
            .schema()
            .fields()
            .iter()
            .enumerate()
            .map(|(i, f)| {
                if i == idx {
                    Field::new(name, f.data_type().clone(), true)
                } else {
                    f.as_ref().clone()
                }
            })
            .collect();
        Ok(RecordBatch::try_new(
            Arc::new(Schema::new(fields)),
            batch.columns().to_vec(),
        )?)
    }

    #[test]
    fn test_structure() -> Result<()> {
        let out = structure(&sample_clean()?)?;

        let names: Vec<String> = out
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        assert_eq!(names, vec!["indic_na", "s_adj", "geo", "time", "value"]);
        assert_eq!(out.num_rows(), 24);

        let ids = ["B1GM", "B1GM", "B1G", "B1G"].repeat(6);
        assert_eq!(strings(&out, "indic_na"), ids);
        assert_eq!(strings(&out, "s_adj"), vec!["SA"; 24]);
        assert_eq!(
            strings(&out, "geo"),
            ["EU28", "EU27", "EU28", "EU27"].repeat(6)
        );
        let time: Vec<String> = ["2014Q2", "2014Q1", "2013Q4", "2013Q3", "2013Q2", "2013Q1"]
            .iter()
            .flat_map(|t| std::iter::repeat(t.to_string()).take(4))
            .collect();
        assert_eq!(strings(&out, "time"), time);

        let values: Vec<Option<f64>> = out
            .column_by_name("value")
            .unwrap()
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap()
            .iter()
            .collect();
        assert_eq!(
            values,
            vec![
                Some(1.0), Some(7.0), Some(13.0), Some(19.0),
                Some(2.0), Some(8.0), None, Some(20.0),
                None, Some(9.0), None, Some(21.0),
                None, Some(10.0), None, Some(22.0),
                Some(5.0), Some(11.0), None, Some(23.0),
                Some(6.0), Some(12.0), None, Some(24.0),
            ]
        );
        Ok(())
    }

    #[test]
    fn shape_is_rows_times_periods() -> Result<()> {
        let clean = sample_clean()?;
        let k = 3;
        let m = clean.num_columns() - k;
        let out = structure(&clean)?;
        assert_eq!(out.num_rows(), clean.num_rows() * m);
        assert_eq!(out.num_columns(), k + 2);
        Ok(())
    }

    #[test]
    fn test_structure_bad_column() -> Result<()> {
        let bad = renamed(&sample_clean()?, 0, "indic_na\\dummy")?;
        let err = structure(&bad).unwrap_err();
        assert_eq!(
            err.downcast_ref::<FormatError>(),
            Some(&FormatError::IdentifierBoundary { found: 2 })
        );
        Ok(())
    }

    #[test]
    fn missing_boundary_is_rejected() -> Result<()> {
        let bad = renamed(&sample_clean()?, 2, "geo")?;
        let err = structure(&bad).unwrap_err();
        assert_eq!(
            err.downcast_ref::<FormatError>(),
            Some(&FormatError::IdentifierBoundary { found: 0 })
        );
        assert!(err.to_string().contains("ambiguous or missing"));
        Ok(())
    }

    #[test]
    fn double_separator_in_one_name_is_rejected() -> Result<()> {
        let bad = renamed(&sample_clean()?, 2, "geo\\time\\extra")?;
        let err = structure(&bad).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FormatError>(),
            Some(FormatError::CompoundName { .. })
        ));
        Ok(())
    }

    #[test]
    fn uncleaned_periods_are_stacked_as_text() -> Result<()> {
        let raw = parse_raw(Cursor::new(SAMPLE_TSV))?;
        let out = structure(&raw)?;
        assert_eq!(out.num_rows(), 24);
        let values = out
            .column_by_name("value")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(values.value(2), "13 p");
        assert!(values.is_null(8));
        Ok(())
    }

    #[test]
    fn mixed_period_types_share_number_formatting() -> Result<()> {
        let raw = parse_raw(Cursor::new("k\\time\t2001\t2002\nA\t1\t13 p\nB\t2\tn/a\n"))?;
        let out = structure(&clean_data(&raw)?)?;
        let values: Vec<Option<&str>> = out
            .column_by_name("value")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap()
            .iter()
            .collect();
        assert_eq!(values, vec![Some("1"), Some("2"), Some("13"), Some("n/a")]);
        Ok(())
    }

    #[test]
    fn no_period_columns_gives_empty_long_table() -> Result<()> {
        let raw = parse_raw(Cursor::new("indic_na,geo\\time\nB1GM,EU28\n"))?;
        let out = structure(&raw)?;
        assert_eq!(out.num_rows(), 0);
        assert_eq!(out.num_columns(), 4);
        Ok(())
    }
}
