// funnelwatch-core/src/infrastructure/report/jinja.rs
//
// Renders the markdown summary from the serialized AggregatedFunnel.

use minijinja::Environment;

use crate::application::ports::TemplateEngine;
use crate::error::FunnelError;
use crate::infrastructure::error::InfrastructureError;

pub struct JinjaRenderer<'a> {
    env: Environment<'a>,
}

impl<'a> JinjaRenderer<'a> {
    pub fn new() -> Self {
        let mut env = Environment::new();

        // 0.0222 -> "2.22%"
        env.add_filter("percent", |value: f64| -> String {
            format!("{:.2}%", value * 100.0)
        });

        // Stage names and page paths go inside markdown tables
        env.add_filter("cell", |value: &str| -> String { value.replace('|', "\\|") });

        Self { env }
    }
}

impl<'a> Default for JinjaRenderer<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> TemplateEngine for JinjaRenderer<'a> {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String, FunnelError> {
        self.env
            .render_str(template, context)
            .map_err(|e| FunnelError::Infrastructure(InfrastructureError::TemplateError(e)))
    }
}
