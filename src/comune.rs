//! The ISTAT municipality record: built-in schema and typed view of the
//! converted output.

use crate::error::{ComuniError, Result};
use crate::schema::{FieldDescriptor, Schema, SemanticType};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Field table for the "Elenco comuni italiani" export. Keys ending in
/// `...` match header prefixes, since ISTAT appends footnote markers to
/// those column names.
const COMUNE_FIELDS: &[(&str, &str, &str)] = &[
    ("codice_regione", "string", "Codice Regione"),
    ("codice_unita_territoriale", "string", "Codice dell'Unità territoriale sovracomunale..."),
    ("codice_provincia", "string", "Codice Provincia (Storico)..."),
    ("progressivo_comune", "string", "Progressivo del Comune..."),
    ("codice_comune", "string", "Codice Comune formato alfanumerico"),
    ("denominazione", "string", "Denominazione (Italiana e straniera)"),
    ("denominazione_ita", "string", "Denominazione in italiano"),
    ("denominazione_non_ita", "string", "Denominazione altra lingua"),
    ("codice_ripartizione_geo", "string", "Codice Ripartizione Geografica"),
    ("ripartizione_geo", "string", "Ripartizione geografica"),
    ("denominazione_regione", "string", "Denominazione Regione"),
    (
        "denominazione_unita_territoriale",
        "string",
        "Denominazione dell'Unità territoriale sovracomunale...",
    ),
    ("tipologia_unita_territoriale", "string", "Tipologia di Unità territoriale sovracomunale"),
    ("comune_capoluogo", "bool", "Flag Comune capoluogo di provincia/città..."),
    ("sigla_automobilistica", "string", "Sigla automobilistica"),
    ("codice_comune_numerico", "int32", "Codice Comune formato numerico"),
    ("codice_comune_numerico_110", "int32", "Codice Comune numerico con 110 province..."),
    ("codice_comune_numerico_107", "int32", "Codice Comune numerico con 107 province..."),
    ("codice_comune_numerico_103", "int32", "Codice Comune numerico con 103 province..."),
    ("codice_nuts1_2010", "string", "Codice NUTS1 2010"),
    ("codice_nuts2_2010", "string", "Codice NUTS2 2010..."),
    ("codice_nuts3_2010", "string", "Codice NUTS3 2010"),
    ("codice_nuts1_2021", "string", "Codice NUTS1 2021"),
    ("codice_nuts2_2021", "string", "Codice NUTS2 2021..."),
    ("codice_nuts3_2021", "string", "Codice NUTS3 2021"),
];

/// Built-in schema for the ISTAT municipality export
pub static COMUNE_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new_unchecked(
        COMUNE_FIELDS
            .iter()
            .map(|&(name, kind, key)| {
                FieldDescriptor::new(name, SemanticType::from_name(kind), key)
            })
            .collect(),
    )
});

/// One converted municipality. Fields missing from the JSON take their
/// default value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Comune {
    pub codice_regione: String,
    pub codice_unita_territoriale: String,
    pub codice_provincia: String,
    pub progressivo_comune: String,
    pub codice_comune: String,
    pub denominazione: String,
    pub denominazione_ita: String,
    pub denominazione_non_ita: String,
    pub codice_ripartizione_geo: String,
    pub ripartizione_geo: String,
    pub denominazione_regione: String,
    pub denominazione_unita_territoriale: String,
    pub tipologia_unita_territoriale: String,
    pub comune_capoluogo: bool,
    pub sigla_automobilistica: String,
    pub codice_comune_numerico: i32,
    pub codice_comune_numerico_110: i32,
    pub codice_comune_numerico_107: i32,
    pub codice_comune_numerico_103: i32,
    pub codice_nuts1_2010: String,
    pub codice_nuts2_2010: String,
    pub codice_nuts3_2010: String,
    pub codice_nuts1_2021: String,
    pub codice_nuts2_2021: String,
    pub codice_nuts3_2021: String,
}

impl Comune {
    /// One listing line: name, ISTAT code, region, province code, plate code
    pub fn listing_line(&self) -> String {
        format!(
            "{:>30}  ISTAT:{} {:<30} {:<4} {:<3}",
            self.denominazione,
            self.codice_comune,
            self.denominazione_regione,
            self.codice_provincia,
            self.sigla_automobilistica
        )
    }
}

/// Read a JSON file produced by the converter
pub fn load_comuni<P: AsRef<Path>>(path: P) -> Result<Vec<Comune>> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| ComuniError::acquisition(path.display().to_string(), e))?;
    let comuni = serde_json::from_reader(BufReader::new(file))?;
    Ok(comuni)
}
