use anyhow::{Context, Result, anyhow, ensure};
use classifier::Dataset;

/// Parses comma separated samples, the label first and then the input values.
///
/// A first line whose label isn't a number is taken to be a header and skipped.
pub fn parse(content: &str) -> Result<Dataset> {
    let mut data = Vec::new();
    let mut labels = Vec::new();
    let mut width = None;
    let mut first = true;

    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let is_first = std::mem::replace(&mut first, false);

        let mut fields = line.split(',').map(str::trim);
        let raw_label = fields.next().unwrap_or_default();

        let label = match raw_label.parse::<usize>() {
            Ok(label) => label,
            Err(_) if is_first => continue,
            Err(e) => return Err(anyhow!("line {i}: cannot parse label '{raw_label}': {e}")),
        };

        let values = fields
            .map(|v| {
                v.parse::<f32>()
                    .with_context(|| format!("line {i}: cannot parse '{v}' as f32"))
            })
            .collect::<Result<Vec<_>>>()?;

        let expected = *width.get_or_insert(values.len());
        ensure!(
            values.len() == expected,
            "line {i}: expected {expected} values, got {}",
            values.len()
        );

        data.extend(values);
        labels.push(label);
    }

    ensure!(!labels.is_empty(), "dataset is empty");
    Ok(Dataset::from_flat(data, width.unwrap_or_default(), labels)?)
}
