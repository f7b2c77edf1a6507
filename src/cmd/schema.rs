//! Schema command - print expected input formats

use crate::tax::records::{CsvField, GainRow, HoldingRow};
use crate::tax::TaxRules;
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: json-schema, csv-header or csv-fields
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,

    /// Which input to describe
    #[arg(short, long, value_enum, default_value = "gains")]
    input: SchemaInput,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for the input format
    JsonSchema,
    /// CSV header row with column names
    CsvHeader,
    /// CSV column descriptions
    CsvFields,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaInput {
    /// Realised capital gain lots
    Gains,
    /// Open positions
    Holdings,
    /// Tax rules override file (JSON only)
    Rules,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => self.print_json_schema(),
            SchemaFormat::CsvHeader => {
                let names: Vec<&str> = self.csv_fields()?.iter().map(|f| f.name).collect();
                println!("{}", names.join(","));
                Ok(())
            }
            SchemaFormat::CsvFields => self.print_csv_fields(),
        }
    }

    fn print_json_schema(&self) -> anyhow::Result<()> {
        let schema = match self.input {
            SchemaInput::Gains => schema_for!(Vec<GainRow>),
            SchemaInput::Holdings => schema_for!(Vec<HoldingRow>),
            SchemaInput::Rules => schema_for!(TaxRules),
        };
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }

    fn csv_fields(&self) -> anyhow::Result<&'static [CsvField]> {
        match self.input {
            SchemaInput::Gains => Ok(GainRow::csv_schema()),
            SchemaInput::Holdings => Ok(HoldingRow::csv_schema()),
            SchemaInput::Rules => anyhow::bail!("Tax rules are read from JSON only"),
        }
    }

    fn print_csv_fields(&self) -> anyhow::Result<()> {
        let fields = self.csv_fields()?;
        println!("CSV Input Format");
        println!("================");
        println!();
        for field in fields {
            let req = if field.required { "required" } else { "optional" };
            println!("{:20} ({:8})  {}", field.name, req, field.description);
            if !field.aliases.is_empty() {
                println!("{:32}also accepted: {}", "", field.aliases.join(", "));
            }
        }
        println!();
        println!("Dates: YYYY-MM-DD, DD-MM-YYYY, DD/MM/YYYY or DD Mon YYYY");
        Ok(())
    }
}
