use crate::coerce::CoerceContext;
use crate::locale::DateLocale;
use sheetrow_common::DateSystem;
use std::fmt;

pub const DEFAULT_CAST_ERROR_TEMPLATE: &str =
    "cannot convert '{value}' at {cell} (column '{column}') to {expected} for field '{field}': {reason}";

pub const DEFAULT_VALIDATION_ERROR_TEMPLATE: &str =
    "'{value}' at {cell} (column '{column}') is not valid for field '{field}': {reason}";

/// Invoked once per mapped row with the instance and its worksheet row.
pub type RowCallback<T> = Box<dyn FnMut(&T, u32)>;

/// Settings for one mapping pass over a table.
///
/// Built from `Default`, then [`crate::Record::configure`], then any caller
/// configurator; read-only once the pass starts.
pub struct MapperConfig<T> {
    /// Skip the table's header row (when the table shows one).
    pub has_header_row: bool,
    /// Raise coercion failures as [`crate::MapError::Cast`] instead of
    /// skipping the rest of the row.
    pub throw_on_cast_failure: bool,
    /// Raise constraint failures as [`crate::MapError::Validation`].
    pub throw_on_validation_failure: bool,
    pub cast_error_template: String,
    pub validation_error_template: String,
    pub date_locale: DateLocale,
    pub date_system: DateSystem,
    on_row: Option<RowCallback<T>>,
}

impl<T> Default for MapperConfig<T> {
    fn default() -> Self {
        Self {
            has_header_row: true,
            throw_on_cast_failure: false,
            throw_on_validation_failure: false,
            cast_error_template: DEFAULT_CAST_ERROR_TEMPLATE.to_string(),
            validation_error_template: DEFAULT_VALIDATION_ERROR_TEMPLATE.to_string(),
            date_locale: DateLocale::default(),
            date_system: DateSystem::default(),
            on_row: None,
        }
    }
}

impl<T> MapperConfig<T> {
    /// Raise both coercion and constraint failures.
    pub fn strict() -> Self {
        Self {
            throw_on_cast_failure: true,
            throw_on_validation_failure: true,
            ..Self::default()
        }
    }

    pub fn with_header_row(mut self, has_header_row: bool) -> Self {
        self.has_header_row = has_header_row;
        self
    }

    pub fn with_throw_on_cast_failure(mut self, throw: bool) -> Self {
        self.throw_on_cast_failure = throw;
        self
    }

    pub fn with_throw_on_validation_failure(mut self, throw: bool) -> Self {
        self.throw_on_validation_failure = throw;
        self
    }

    pub fn with_cast_error_template(mut self, template: impl Into<String>) -> Self {
        self.cast_error_template = template.into();
        self
    }

    pub fn with_validation_error_template(mut self, template: impl Into<String>) -> Self {
        self.validation_error_template = template.into();
        self
    }

    pub fn with_date_locale(mut self, locale: DateLocale) -> Self {
        self.date_locale = locale;
        self
    }

    pub fn with_date_system(mut self, system: DateSystem) -> Self {
        self.date_system = system;
        self
    }

    pub fn with_on_row<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&T, u32) + 'static,
    {
        self.on_row = Some(Box::new(callback));
        self
    }

    /// Install the row callback from inside a configurator closure.
    pub fn on_row<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnMut(&T, u32) + 'static,
    {
        self.on_row = Some(Box::new(callback));
        self
    }

    /// Conversion settings handed to every [`crate::CellField`] call.
    pub fn coerce_context(&self) -> CoerceContext<'_> {
        CoerceContext {
            locale: &self.date_locale,
            date_system: self.date_system,
        }
    }

    pub(crate) fn notify_row(&mut self, item: &T, row: u32) {
        if let Some(callback) = self.on_row.as_mut() {
            callback(item, row);
        }
    }
}

impl<T> fmt::Debug for MapperConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperConfig")
            .field("has_header_row", &self.has_header_row)
            .field("throw_on_cast_failure", &self.throw_on_cast_failure)
            .field("throw_on_validation_failure", &self.throw_on_validation_failure)
            .field("cast_error_template", &self.cast_error_template)
            .field("validation_error_template", &self.validation_error_template)
            .field("date_locale", &self.date_locale.name())
            .field("date_system", &self.date_system)
            .field("on_row", &self.on_row.is_some())
            .finish()
    }
}
