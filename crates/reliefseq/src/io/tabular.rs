//! Delimited text data sets: one row per instance, one column per attribute,
//! the phenotype in the last column and an optional leading instance id column.
use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use csv::StringRecord;
use ndarray::Array2;

pub use crate::config::PhenotypeKind;
use crate::config::ReliefSeqConfig;
use crate::data_handling::{AttributeKind, ClassLevel, Dataset, Phenotype};

/// Configuration for reading delimited data set files.
#[derive(Debug, Clone)]
pub struct TabularReaderConfig {
    /// Field delimiter. When `None` it follows the file extension: `.csv` is
    /// comma separated, everything else tab separated.
    pub delimiter: Option<u8>,
    /// Header names recognized as an instance id column when they come first.
    pub id_columns: Vec<String>,
    pub phenotype_kind: PhenotypeKind,
}

impl Default for TabularReaderConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            id_columns: vec![
                "ID".to_string(),
                "IID".to_string(),
                "Sample".to_string(),
                "SampleId".to_string(),
                "Instance".to_string(),
            ],
            phenotype_kind: PhenotypeKind::Auto,
        }
    }
}

impl TabularReaderConfig {
    /// Default reader settings with the run's phenotype interpretation.
    pub fn from_config(config: &ReliefSeqConfig) -> Self {
        Self {
            phenotype_kind: config.phenotype_kind,
            ..Self::default()
        }
    }
}

/// Read a tab or comma delimited data set.
pub fn read_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    read_dataset_with_config(path, &TabularReaderConfig::default())
}

/// Read a delimited data set using a custom configuration.
pub fn read_dataset_with_config<P: AsRef<Path>>(
    path: P,
    config: &TabularReaderConfig,
) -> Result<Dataset> {
    let path = path.as_ref();
    let delimiter = config.delimiter.unwrap_or_else(|| delimiter_for(path));
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open data set: {}", path.display()))?;

    let headers = reader
        .headers()
        .context("Failed to read data set header row")?
        .clone();
    if headers.len() < 2 {
        bail!(
            "Data set header needs at least one attribute and a phenotype column, found {} columns",
            headers.len()
        );
    }

    let has_id = headers
        .get(0)
        .map(|first| config.id_columns.iter().any(|c| c.eq_ignore_ascii_case(first)))
        .unwrap_or(false);
    let first_attribute = if has_id { 1 } else { 0 };
    let phenotype_idx = headers.len() - 1;
    if phenotype_idx <= first_attribute {
        bail!("Data set has no attribute columns");
    }
    let attribute_names: Vec<String> = (first_attribute..phenotype_idx)
        .map(|idx| headers.get(idx).unwrap_or("").to_string())
        .collect();

    let mut instance_ids = Vec::new();
    let mut values = Vec::new();
    let mut raw_phenotypes = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;
        if record.len() != headers.len() {
            bail!(
                "Row {} has {} fields, expected {}",
                row_idx + 1,
                record.len(),
                headers.len()
            );
        }

        instance_ids.push(if has_id {
            record.get(0).unwrap_or_default().to_string()
        } else {
            format!("instance_{}", row_idx + 1)
        });

        for idx in first_attribute..phenotype_idx {
            values.push(parse_field(&record, &headers, idx, row_idx)?);
        }
        raw_phenotypes.push(parse_field(&record, &headers, phenotype_idx, row_idx)?);
    }

    let n_instances = instance_ids.len();
    let matrix = Array2::from_shape_vec((n_instances, attribute_names.len()), values)
        .context("Failed to build attribute matrix")?;
    let phenotype = build_phenotype(raw_phenotypes, config.phenotype_kind)?;

    let dataset = Dataset::new(instance_ids, attribute_names, matrix, phenotype)
        .with_context(|| format!("Invalid data set: {}", path.display()))?;
    log::info!(
        "Read {} instances and {} attributes from {}",
        dataset.instance_ids().len(),
        dataset.values().ncols(),
        path.display()
    );
    Ok(dataset)
}

/// Write the instances and the remaining attributes of `dataset` to `path`,
/// delimited by the file extension (`.csv` comma, `.tsv`/`.txt`/`.tab` tab).
pub fn write_filtered_dataset<P: AsRef<Path>>(dataset: &Dataset, path: P) -> Result<()> {
    let path = path.as_ref();
    validate_dataset_extension(path)?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter_for(path))
        .from_path(path)
        .with_context(|| format!("Failed to create data set file: {}", path.display()))?;

    let attributes = dataset.active_attribute_indices();
    let phenotype_header = match dataset.phenotype() {
        Phenotype::Classes(_) => "Class",
        Phenotype::Continuous(_) => "Phenotype",
    };
    let mut header = Vec::with_capacity(attributes.len() + 2);
    header.push("ID".to_string());
    header.extend(attributes.iter().map(|&a| dataset.attribute_name(a).to_string()));
    header.push(phenotype_header.to_string());
    writer.write_record(&header)?;

    for (i, id) in dataset.instance_ids().iter().enumerate() {
        let mut row = Vec::with_capacity(header.len());
        row.push(id.clone());
        for &a in &attributes {
            let v = dataset.value(i, a);
            row.push(match dataset.attribute_kind(a) {
                AttributeKind::Discrete => format!("{}", v as i64),
                AttributeKind::Numeric => format!("{}", v),
            });
        }
        row.push(match dataset.phenotype() {
            Phenotype::Classes(c) => c[i].to_string(),
            Phenotype::Continuous(y) => y[i].to_string(),
        });
        writer.write_record(&row)?;
    }
    writer.flush()?;

    log::info!(
        "Wrote {} instances with {} attributes to {}",
        dataset.instance_ids().len(),
        attributes.len(),
        path.display()
    );
    Ok(())
}

/// Read allele annotations: `name<TAB>allele1<TAB>allele2`, no header.
pub fn read_allele_map<P: AsRef<Path>>(path: P) -> Result<HashMap<String, (char, char)>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open allele file: {}", path.display()))?;

    let mut alleles = HashMap::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read allele row {}", row_idx + 1))?;
        let name = record
            .get(0)
            .ok_or_else(|| anyhow!("Missing attribute name at allele row {}", row_idx + 1))?;
        let allele = |idx: usize| -> Result<char> {
            record
                .get(idx)
                .and_then(|s| s.chars().next())
                .ok_or_else(|| anyhow!("Missing allele {} at allele row {}", idx, row_idx + 1))
        };
        alleles.insert(name.to_string(), (allele(1)?, allele(2)?));
    }
    Ok(alleles)
}

/// Read attribute names, one per line. Only the first whitespace separated
/// token of a line counts; blank lines and `#` comments are skipped.
pub fn read_name_list<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read name list: {}", path.display()))?;
    Ok(text
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .filter(|token| !token.starts_with('#'))
        .map(str::to_string)
        .collect())
}

pub fn validate_dataset_extension(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("tsv") | Some("txt") | Some("tab") | Some("csv") => Ok(()),
        _ => bail!(
            "Data set file must have a .tsv, .txt, .tab or .csv extension: {}",
            path.display()
        ),
    }
}

fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => b',',
        _ => b'\t',
    }
}

fn parse_field(record: &StringRecord, headers: &StringRecord, idx: usize, row_idx: usize) -> Result<f64> {
    let value = record
        .get(idx)
        .ok_or_else(|| anyhow!("Missing value at row {}", row_idx + 1))?;
    value.parse::<f64>().with_context(|| {
        format!(
            "Invalid value '{}' for '{}' at row {}",
            value,
            headers.get(idx).unwrap_or(""),
            row_idx + 1
        )
    })
}

fn build_phenotype(raw: Vec<f64>, kind: PhenotypeKind) -> Result<Phenotype> {
    let integral = raw.iter().all(|v| v.fract() == 0.0 && v.is_finite());
    let discrete = match kind {
        PhenotypeKind::Auto => integral,
        PhenotypeKind::Discrete => {
            if !integral {
                bail!("Discrete phenotype column holds non-integer values");
            }
            true
        }
        PhenotypeKind::Continuous => false,
    };
    Ok(if discrete {
        Phenotype::Classes(raw.into_iter().map(|v| v as ClassLevel).collect())
    } else {
        Phenotype::Continuous(raw)
    })
}
