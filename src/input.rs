use crate::models::Result;

/// Read the input URL list: one row per site, `domain` column required.
pub async fn read_domains(path: &str) -> Result<Vec<String>> {
    let (headers, rows) = read_rows(path).await?;
    let domain_idx = headers
        .iter()
        .position(|header| header == "domain")
        .ok_or_else(|| format!("input CSV {path} has no 'domain' column"))?;

    Ok(rows
        .into_iter()
        .filter_map(|row| row.into_iter().nth(domain_idx))
        .filter(|domain| !domain.is_empty())
        .collect())
}

/// Read a CSV file into a header row plus data rows. Enough CSV for the
/// inputs this tool consumes: quoted fields and doubled-quote escapes,
/// no embedded newlines.
pub async fn read_rows(path: &str) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let content = tokio::fs::read_to_string(path).await?;
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());

    let headers = lines
        .next()
        .map(parse_csv_line)
        .ok_or_else(|| format!("input CSV {path} is empty"))?;
    let rows = lines.map(parse_csv_line).collect();

    Ok((headers, rows))
}

pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);

    fields.into_iter().map(|f| f.trim().to_string()).collect()
}
