use crate::core::{IngestError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    String,
    Integer,
    Float,
    Boolean,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: &'static str,
    pub data_type: DataType,
    pub nullable: bool,
}

impl Field {
    pub const fn new(name: &'static str, data_type: DataType, nullable: bool) -> Self {
        Self {
            name,
            data_type,
            nullable,
        }
    }
}

/// Fixed column set of a delimited dataset handled by the pipeline.
#[derive(Debug, Clone)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Columns the streams file must provide. Extra columns are ignored.
    pub fn stream_events() -> Self {
        Schema::new(vec![
            Field::new("stream_id", DataType::String, true),
            Field::new("customer_id", DataType::Integer, false),
            Field::new("subscription_stopped", DataType::Float, true),
            Field::new("invoice_item_id", DataType::Integer, true),
        ])
    }

    /// Column set of the clean output dataset, in writing order.
    pub fn clean_output() -> Self {
        Schema::new(vec![
            Field::new("customer_id", DataType::Integer, false),
            Field::new("country_name", DataType::String, false),
            Field::new("age", DataType::Integer, true),
            Field::new("customer_name", DataType::String, false),
            Field::new("is_subscriber", DataType::Boolean, false),
            Field::new("subscription_type", DataType::String, false),
            Field::new("num_streams", DataType::Integer, false),
        ])
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// Checks that every declared column is present in a file header.
    pub fn validate_header(&self, columns: &[&str]) -> Result<()> {
        for field in &self.fields {
            if !columns.iter().any(|c| c.trim() == field.name) {
                return Err(IngestError::Schema(format!(
                    "required column '{}' missing from header",
                    field.name
                )));
            }
        }
        Ok(())
    }
}
