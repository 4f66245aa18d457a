use crate::binding::BindingTable;
use crate::config::{Config, Dialect};
use crate::detection::{convert_to_utf8, detect_charset, DetectedEncoding};
use crate::error::Result;
use crate::output::{records_to_json, write_output};
use crate::reader::read_table;
use crate::record::{Materializer, TypedRecord};
use crate::schema::Schema;
use crate::source::Source;
use tracing::{info, warn};

/// Result of converting one input
#[derive(Debug, Clone)]
pub struct Conversion {
    pub encoding: DetectedEncoding,
    pub binding: BindingTable,
    pub records: Vec<TypedRecord>,
}

impl Conversion {
    /// Names of schema fields no header column matched
    pub fn unbound_fields(&self) -> Vec<&str> {
        self.binding.unbound().map(|d| d.name.as_str()).collect()
    }
}

/// Schema-directed converter from raw delimited bytes to typed records
pub struct Converter<'s> {
    schema: &'s Schema,
    dialect: Dialect,
}

impl<'s> Converter<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Converter {
            schema,
            dialect: Dialect::default(),
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Detect encoding, parse, bind and materialize. Nothing is returned
    /// unless every row converts.
    pub fn convert(&self, data: &[u8]) -> Result<Conversion> {
        let encoding = detect_charset(data);
        if !encoding.certain {
            warn!(
                encoding = encoding.name(),
                "input encoding is a best guess"
            );
        }
        let text = convert_to_utf8(data, &encoding);

        let table = read_table(&text, &self.dialect)?;
        let binding = BindingTable::bind(table.header.cells(), self.schema);
        let records = Materializer::new(&binding)?.materialize(&table.body)?;

        info!(
            encoding = encoding.name(),
            records = records.len(),
            columns = binding.column_count(),
            bound = binding.bound().count(),
            fields = self.schema.len(),
            "converted table"
        );
        Ok(Conversion {
            encoding,
            binding,
            records,
        })
    }
}

/// Full `convert` run: acquire, convert, serialize, then write the output
pub fn run_convert(config: &Config, schema: &Schema) -> Result<Conversion> {
    let source = Source::parse(&config.source)?;
    let data = source.fetch(&config.transport)?;

    let conversion = Converter::new(schema)
        .with_dialect(config.dialect)
        .convert(&data)?;
    let json = records_to_json(&conversion.records, config.pretty)?;
    write_output(&config.output, &json)?;

    info!(
        output = %config.output.display(),
        records = conversion.records.len(),
        "wrote output"
    );
    Ok(conversion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comune::{Comune, COMUNE_SCHEMA};
    use crate::error::ComuniError;
    use crate::record::Value;
    use crate::schema::{FieldDescriptor, SemanticType};
    use encoding_rs::WINDOWS_1252;
    use std::fs;

    const ISTAT_HEADER: &str = "Codice Regione;Codice dell'Unità territoriale sovracomunale \n(valida a fini statistici);Codice Provincia (Storico)(1);Progressivo del Comune (2);Codice Comune formato alfanumerico;Denominazione (Italiana e straniera);Denominazione in italiano;Denominazione altra lingua;Codice Ripartizione Geografica;Ripartizione geografica;Denominazione Regione;Denominazione dell'Unità territoriale sovracomunale \n(valida a fini statistici);Tipologia di Unità territoriale sovracomunale ;Flag Comune capoluogo di provincia/città metropolitana/libero consorzio;Sigla automobilistica;Codice Comune formato numerico;Codice Comune numerico con 110 province (dal 2010 al 2016);Codice Comune numerico con 107 province (dal 2006 al 2009);Codice Comune numerico con 103 province (dal 1995 al 2005);Codice Catastale del comune;Codice NUTS1 2010;Codice NUTS2 2010 (3) ;Codice NUTS3 2010;Codice NUTS1 2021;Codice NUTS2 2021 (3) ;Codice NUTS3 2021";

    const TORINO: &str = "01;201;001;272;001272;Torino;Torino;;1;Nord-ovest;Piemonte;Torino;3;TRUE;TO;1272;1272;1272;1272;L219;ITC;ITC1;ITC11;ITC;ITC1;ITC11";
    const AGLIE: &str = "01;201;001;001;001001;Agliè;Agliè;;1;Nord-ovest;Piemonte;Torino;3;FALSE;TO;1001;1001;1001;1001;A074;ITC;ITC1;ITC11;ITC;ITC1;ITC11";

    fn istat_sample() -> String {
        // The real export quotes the multi-line header cells
        let header: Vec<String> = ISTAT_HEADER
            .split(';')
            .map(|cell| {
                if cell.contains('\n') {
                    format!("\"{}\"", cell)
                } else {
                    cell.to_string()
                }
            })
            .collect();
        format!("{}\r\n{}\r\n{}\r\n", header.join(";"), TORINO, AGLIE)
    }

    #[test]
    fn test_convert_istat_windows_1252() {
        let sample = istat_sample();
        let (data, _, _) = WINDOWS_1252.encode(&sample);
        let conversion = Converter::new(&COMUNE_SCHEMA).convert(&data).unwrap();

        assert_ne!(conversion.encoding.encoding, encoding_rs::UTF_8);
        assert!(conversion.unbound_fields().is_empty());
        assert_eq!(conversion.records.len(), 2);

        let json = serde_json::to_string(&conversion.records).unwrap();
        let comuni: Vec<Comune> = serde_json::from_str(&json).unwrap();
        assert_eq!(comuni[0].denominazione, "Torino");
        assert!(comuni[0].comune_capoluogo);
        assert_eq!(comuni[0].codice_comune_numerico, 1272);
        assert_eq!(comuni[0].codice_unita_territoriale, "201");
        assert_eq!(comuni[0].codice_nuts2_2010, "ITC1");
        assert_eq!(comuni[1].denominazione, "Agliè");
        assert!(!comuni[1].comune_capoluogo);
        assert_eq!(comuni[1].codice_comune, "001001");
    }

    #[test]
    fn test_convert_utf8_reordered_columns() {
        let text = "# ISTAT\n\
                    Sigla automobilistica;Denominazione (Italiana e straniera);Codice REGIONE\n \
                    TO ; Torino ;01\n";
        let conversion = Converter::new(&COMUNE_SCHEMA)
            .convert(text.as_bytes())
            .unwrap();
        let record = &conversion.records[0];
        assert_eq!(record.len(), 3);
        let string = |s: &str| Some(Value::String(s.to_string()));
        assert_eq!(record.get("sigla_automobilistica").cloned(), string("TO"));
        assert_eq!(record.get("denominazione").cloned(), string("Torino"));
        assert_eq!(record.get("codice_regione").cloned(), string("01"));
        assert_eq!(conversion.unbound_fields().len(), 22);
    }

    #[test]
    fn test_convert_header_only() {
        let conversion = Converter::new(&COMUNE_SCHEMA)
            .convert(b"Codice Regione;Sigla automobilistica\n")
            .unwrap();
        assert!(conversion.records.is_empty());
    }

    #[test]
    fn test_convert_bad_boolean_fails() {
        let text = "Denominazione Regione;Flag Comune capoluogo di provincia/città metropolitana\n\
                    Piemonte;TRUE\n\
                    Piemonte;1\n";
        let err = Converter::new(&COMUNE_SCHEMA)
            .convert(text.as_bytes())
            .unwrap_err();
        assert!(matches!(err, ComuniError::TypeCoercion { line: 3, .. }));
    }

    #[test]
    fn test_convert_unsupported_type_fails() {
        let schema = Schema::new(vec![
            FieldDescriptor::new("nome", SemanticType::String, "Nome"),
            FieldDescriptor::new("superficie", SemanticType::from_name("float64"), "Superficie..."),
        ])
        .unwrap();
        let err = Converter::new(&schema)
            .convert(b"Nome;Superficie (km2)\nTorino;130.01\n")
            .unwrap_err();
        assert!(matches!(err, ComuniError::UnsupportedFieldType { .. }));
    }

    #[test]
    fn test_run_convert_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("comuni.csv");
        let output = dir.path().join("comuni.json");
        fs::write(&input, istat_sample()).unwrap();

        let config = Config::new(input.to_str().unwrap(), &output);
        let conversion = run_convert(&config, &COMUNE_SCHEMA).unwrap();
        assert_eq!(conversion.records.len(), 2);

        let comuni = crate::comune::load_comuni(&output).unwrap();
        assert_eq!(comuni.len(), 2);
        assert_eq!(comuni[1].sigla_automobilistica, "TO");
    }

    #[test]
    fn test_run_convert_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("comuni.csv");
        let output = dir.path().join("comuni.json");
        fs::write(&input, "Codice Comune formato numerico\n1272\nmille\n").unwrap();

        let config = Config::new(input.to_str().unwrap(), &output);
        let err = run_convert(&config, &COMUNE_SCHEMA).unwrap_err();
        assert!(matches!(err, ComuniError::TypeCoercion { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_run_convert_ragged_rows_fail() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("comuni.csv");
        let output = dir.path().join("comuni.json");
        fs::write(&input, "Codice Regione;Denominazione Regione\n01;Piemonte\n02\n").unwrap();

        let config = Config::new(input.to_str().unwrap(), &output);
        let err = run_convert(&config, &COMUNE_SCHEMA).unwrap_err();
        assert!(matches!(err, ComuniError::Parse { .. }));
        assert!(!output.exists());
    }
}
