//! Data binding: fills the data slots of a chart template from dataset columns.

use crate::render::chart_type::ChartType;
use crate::render::styling::Styling;
use crate::render::RenderError;
use crate::table::RecordTable;
use crate::table::Scalar;
use serde_json::json;
use serde_json::Map;
use serde_json::Value;

/// Column bindings of one chart, checked against its chart type.
#[derive(Clone, Debug, PartialEq)]
pub enum Binding {
    Bar { x: String, y: String },
    Pie { name: String, value: String },
    CategoryBar { category: String, series: Vec<String> },
}

impl Binding {
    /// Picks the styling fields `chart_type` needs. Absent or empty fields are
    /// reported as missing styling.
    pub fn resolve(chart_type: ChartType, styling: &Styling) -> Result<Self, RenderError> {
        let missing = |field: &str| RenderError::MissingStyling(chart_type, field.to_owned());
        let binding = match chart_type {
            ChartType::Bar => Binding::Bar {
                x: required(&styling.x_col_name).ok_or_else(|| missing("x_col_name"))?,
                y: required(&styling.y_col_name).ok_or_else(|| missing("y_col_name"))?,
            },
            ChartType::Pie => Binding::Pie {
                name: required(&styling.name_col).ok_or_else(|| missing("name_col"))?,
                value: required(&styling.value_col).ok_or_else(|| missing("value_col"))?,
            },
            ChartType::CategoryBar => Binding::CategoryBar {
                category: required(&styling.category_col).ok_or_else(|| missing("category_col"))?,
                series: styling
                    .series_cols
                    .to_owned()
                    .filter(|columns| !columns.is_empty())
                    .ok_or_else(|| missing("series_cols"))?,
            },
        };
        Ok(binding)
    }

    /// Writes the dataset into `template`. Every bound column must exist
    /// before anything is written.
    pub fn bind(&self, template: &mut Value, table: &RecordTable, title: Option<&Scalar>) -> Result<(), RenderError> {
        match self {
            Binding::Bar { x, y } => {
                let x_data = column_values(table, x)?;
                let y_data = column_values(table, y)?;
                object_slot(template, "xAxis")?.insert("data".to_owned(), x_data);
                first_series(template)?.insert("data".to_owned(), y_data);
            }
            Binding::Pie { name, value } => {
                let names = column(table, name)?;
                let values = column(table, value)?;
                let data = names
                    .into_iter()
                    .zip(values)
                    .map(|(name, value)| json!({ "name": Value::from(name), "value": Value::from(value) }))
                    .collect();
                first_series(template)?.insert("data".to_owned(), Value::Array(data));
            }
            Binding::CategoryBar { category, series } => {
                let categories = column_values(table, category)?;
                let series = series
                    .iter()
                    .map(|name| {
                        Ok(json!({
                            "name": name,
                            "type": "bar",
                            "data": column_values(table, name)?,
                        }))
                    })
                    .collect::<Result<Vec<Value>, RenderError>>()?;
                let title = match title {
                    Some(title) if !title.is_null() => Value::from(title),
                    _ => Value::from(""),
                };
                object_slot(template, "title")?.insert("text".to_owned(), title);
                object_slot(template, "yAxis")?.insert("data".to_owned(), categories);
                root(template)?.insert("series".to_owned(), Value::Array(series));
            }
        }
        Ok(())
    }
}

fn required(field: &Option<String>) -> Option<String> {
    field.as_ref().filter(|value| !value.is_empty()).cloned()
}

fn column<'a>(table: &'a RecordTable, name: &str) -> Result<Vec<&'a Scalar>, RenderError> {
    table
        .column(name)
        .ok_or_else(|| RenderError::MissingColumn(name.to_owned()))
}

fn column_values(table: &RecordTable, name: &str) -> Result<Value, RenderError> {
    Ok(Value::Array(column(table, name)?.into_iter().map(Value::from).collect()))
}

fn root(template: &mut Value) -> Result<&mut Map<String, Value>, RenderError> {
    template
        .as_object_mut()
        .ok_or_else(|| RenderError::MissingSlot("<root>".to_owned()))
}

fn object_slot<'a>(template: &'a mut Value, key: &str) -> Result<&'a mut Map<String, Value>, RenderError> {
    template
        .get_mut(key)
        .and_then(Value::as_object_mut)
        .ok_or_else(|| RenderError::MissingSlot(key.to_owned()))
}

fn first_series(template: &mut Value) -> Result<&mut Map<String, Value>, RenderError> {
    template
        .get_mut("series")
        .and_then(Value::as_array_mut)
        .and_then(|series| series.first_mut())
        .and_then(Value::as_object_mut)
        .ok_or_else(|| RenderError::MissingSlot("series[0]".to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TabularBlob;

    fn table(text: &str) -> RecordTable {
        TabularBlob::from(text).parse().unwrap()
    }

    fn styling(json: Value) -> Styling {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn bar_binding() {
        let binding = Binding::resolve(ChartType::Bar, &styling(json!({"x_col_name": "k", "y_col_name": "v"}))).unwrap();
        let mut template = json!({"xAxis": {"type": "category"}, "series": [{"type": "bar"}]});
        binding.bind(&mut template, &table("k,v\nA,1\nB,2"), None).unwrap();
        assert_eq!(template["xAxis"]["data"], json!(["A", "B"]));
        assert_eq!(template["series"][0]["data"], json!([1, 2]));
        assert_eq!(template["series"][0]["type"], json!("bar"));
    }

    #[test]
    fn pie_binding() {
        let binding = Binding::resolve(ChartType::Pie, &styling(json!({"name_col": "fruit", "value_col": "n"}))).unwrap();
        let mut template = json!({"series": [{"type": "pie", "radius": "50%"}]});
        binding.bind(&mut template, &table("fruit,n\nApples,3\nPears,5"), None).unwrap();
        assert_eq!(
            template["series"][0]["data"],
            json!([{"name": "Apples", "value": 3}, {"name": "Pears", "value": 5}])
        );
    }

    #[test]
    fn category_bar_binding() {
        let binding = Binding::resolve(
            ChartType::CategoryBar,
            &styling(json!({"category_col": "cat", "series_cols": ["s1", "s2"]})),
        )
        .unwrap();
        let mut template = json!({
            "title": {"text": "placeholder"},
            "yAxis": {"type": "category"},
            "series": [{"name": "old"}]
        });
        let title = Scalar::from("Fruit by year");
        binding
            .bind(&mut template, &table("cat,s1,s2\nX,1,3\nY,2,4"), Some(&title))
            .unwrap();
        assert_eq!(template["title"]["text"], json!("Fruit by year"));
        assert_eq!(template["yAxis"]["data"], json!(["X", "Y"]));
        assert_eq!(
            template["series"],
            json!([
                {"name": "s1", "type": "bar", "data": [1, 2]},
                {"name": "s2", "type": "bar", "data": [3, 4]}
            ])
        );
    }

    #[test]
    fn null_title_becomes_empty_text() {
        let binding = Binding::CategoryBar {
            category: "cat".to_owned(),
            series: vec!["s1".to_owned()],
        };
        let mut template = json!({"title": {}, "yAxis": {}});
        binding.bind(&mut template, &table("cat,s1\nX,1"), Some(&Scalar::Null)).unwrap();
        assert_eq!(template["title"]["text"], json!(""));
    }

    #[test]
    fn missing_styling_fields() {
        let error = Binding::resolve(ChartType::Bar, &styling(json!({"x_col_name": "k"}))).unwrap_err();
        assert!(matches!(error, RenderError::MissingStyling(ChartType::Bar, ref field) if field == "y_col_name"));
        let error = Binding::resolve(ChartType::Pie, &styling(json!({"name_col": "", "value_col": "n"}))).unwrap_err();
        assert!(matches!(error, RenderError::MissingStyling(ChartType::Pie, _)));
        let error = Binding::resolve(
            ChartType::CategoryBar,
            &styling(json!({"category_col": "cat", "series_cols": []})),
        )
        .unwrap_err();
        assert!(matches!(error, RenderError::MissingStyling(ChartType::CategoryBar, _)));
    }

    #[test]
    fn missing_column_leaves_template_untouched() {
        let binding = Binding::Bar {
            x: "k".to_owned(),
            y: "missing".to_owned(),
        };
        let mut template = json!({"xAxis": {}, "series": [{}]});
        let error = binding.bind(&mut template, &table("k,v\nA,1"), None).unwrap_err();
        assert!(matches!(error, RenderError::MissingColumn(ref name) if name == "missing"));
        assert_eq!(template, json!({"xAxis": {}, "series": [{}]}));
    }

    #[test]
    fn missing_slot_is_an_error() {
        let binding = Binding::Bar {
            x: "k".to_owned(),
            y: "v".to_owned(),
        };
        let mut template = json!({"xAxis": {}, "series": []});
        let error = binding.bind(&mut template, &table("k,v\nA,1"), None).unwrap_err();
        assert!(matches!(error, RenderError::MissingSlot(ref slot) if slot == "series[0]"));
    }
}
