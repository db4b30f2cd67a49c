use crate::render::RenderError;
use std::fmt::Display;

/// Chart kinds a template and binder exist for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChartType {
    Bar,
    Pie,
    CategoryBar,
}

impl ChartType {
    pub const ALL: [ChartType; 3] = [ChartType::Bar, ChartType::Pie, ChartType::CategoryBar];

    /// Parses a `Chart Type` label. Surrounding whitespace and case are ignored.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "bar chart" => Some(ChartType::Bar),
            "pie chart" => Some(ChartType::Pie),
            "bar chart categories" => Some(ChartType::CategoryBar),
            _ => None,
        }
    }

    /// Key naming the template file, `<key>_template.json`.
    pub fn template_key(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar_chart",
            ChartType::Pie => "pie_chart",
            ChartType::CategoryBar => "bar_chart_categories",
        }
    }

    pub fn template_file_name(&self) -> String {
        format!("{}_template.json", self.template_key())
    }

    /// Suffix of rendered file names, `<chart id>_<suffix>.json`.
    pub fn output_suffix(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar_chart",
            ChartType::Pie => "pie_chart",
            ChartType::CategoryBar => "category_bar_chart",
        }
    }

    /// Ids holding path separators are rejected so every chart lands
    /// directly inside the output directory.
    pub fn output_file_name(&self, chart_id: &str) -> Result<String, RenderError> {
        if chart_id.contains(['/', '\\', '\0']) {
            return Err(RenderError::InvalidFileName(chart_id.to_owned()));
        }
        Ok(format!("{}_{}.json", chart_id, self.output_suffix()))
    }
}

impl Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ChartType::Bar => "bar chart",
            ChartType::Pie => "pie chart",
            ChartType::CategoryBar => "bar chart categories",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_normalized() {
        assert_eq!(ChartType::from_label(" Bar Chart "), Some(ChartType::Bar));
        assert_eq!(ChartType::from_label("PIE CHART"), Some(ChartType::Pie));
        assert_eq!(ChartType::from_label("Bar chart categories"), Some(ChartType::CategoryBar));
        assert_eq!(ChartType::from_label("line chart"), None);
        assert_eq!(ChartType::from_label(""), None);
    }

    #[test]
    fn file_names() {
        assert_eq!(ChartType::CategoryBar.template_file_name(), "bar_chart_categories_template.json");
        assert_eq!(ChartType::CategoryBar.output_file_name("2.4").unwrap(), "2.4_category_bar_chart.json");
        assert_eq!(ChartType::Pie.output_file_name("1.1").unwrap(), "1.1_pie_chart.json");
        for chart_type in ChartType::ALL {
            assert_eq!(ChartType::from_label(&chart_type.to_string()), Some(chart_type));
        }
    }

    #[test]
    fn ids_with_path_separators_are_rejected() {
        for chart_id in ["../1.1", "a/b", "..\\1.1"] {
            let error = ChartType::Bar.output_file_name(chart_id).unwrap_err();
            assert!(matches!(error, RenderError::InvalidFileName(ref id) if id == chart_id));
        }
        assert_eq!(ChartType::Bar.output_file_name("..").unwrap(), ".._bar_chart.json");
    }
}
