use crate::descriptor::PathSegment;
use tether_core::path::path_escape;

///
/// TemplatePart
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TemplatePart {
    Literal(String),
    Param(String),
}

///
/// PathTemplate
///
/// URL path of an endpoint with one placeholder per parameter segment.
/// Placeholders are filled with percent-escaped values in declaration order.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PathTemplate {
    parts: Vec<TemplatePart>,
}

impl PathTemplate {
    #[must_use]
    pub fn new(segments: &[PathSegment]) -> Self {
        let parts = segments
            .iter()
            .map(|seg| match seg {
                PathSegment::Literal(value) => TemplatePart::Literal(value.clone()),
                PathSegment::Param { name, .. } => TemplatePart::Param(name.clone()),
            })
            .collect();

        Self { parts }
    }

    #[must_use]
    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }

    #[must_use]
    pub fn param_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|part| matches!(part, TemplatePart::Param(_)))
            .count()
    }

    #[must_use]
    pub fn param_names(&self) -> Vec<&str> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                TemplatePart::Param(name) => Some(name.as_str()),
                TemplatePart::Literal(_) => None,
            })
            .collect()
    }

    /// `format!` string with `{}` per parameter, e.g. `/hello/{}`.
    #[must_use]
    pub fn format_string(&self) -> String {
        if self.parts.is_empty() {
            return "/".to_string();
        }

        let mut out = String::new();
        for part in &self.parts {
            out.push('/');
            match part {
                TemplatePart::Literal(value) => {
                    out.push_str(&value.replace('{', "{{").replace('}', "}}"));
                }
                TemplatePart::Param(_) => out.push_str("{}"),
            }
        }

        out
    }

    /// Substitute `values` (escaped here) into the placeholders.
    ///
    /// Returns `None` if the value count does not match the parameter count.
    #[must_use]
    pub fn render(&self, values: &[&str]) -> Option<String> {
        if values.len() != self.param_count() {
            return None;
        }
        if self.parts.is_empty() {
            return Some("/".to_string());
        }

        let mut values = values.iter();
        let mut out = String::new();
        for part in &self.parts {
            out.push('/');
            match part {
                TemplatePart::Literal(value) => out.push_str(value),
                TemplatePart::Param(_) => out.push_str(&path_escape(values.next()?)),
            }
        }

        Some(out)
    }

    /// Inverse of [`render`](Self::render): the escaped parameter values of
    /// `path`, in declaration order, or `None` if `path` does not match.
    #[must_use]
    pub fn parse(&self, path: &str) -> Option<Vec<String>> {
        let rest = path.strip_prefix('/')?;
        if self.parts.is_empty() {
            return rest.is_empty().then(Vec::new);
        }

        let segments: Vec<&str> = rest.split('/').collect();
        if segments.len() != self.parts.len() {
            return None;
        }

        let mut values = Vec::with_capacity(self.param_count());
        for (part, segment) in self.parts.iter().zip(segments) {
            match part {
                TemplatePart::Literal(value) if value == segment => {}
                TemplatePart::Literal(_) => return None,
                TemplatePart::Param(_) => values.push(segment.to_string()),
            }
        }

        Some(values)
    }
}
