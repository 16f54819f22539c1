use crate::utils;
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use itertools::Itertools;
use std::default::Default;
use std::fmt::{Debug, Display};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// A plain table of headers and rows, written as delimited text or markdown.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<T>
where
    T: Display,
{
    pub headers: Vec<T>,
    pub rows: Vec<Vec<T>>,
}

impl<T> Default for Table<T>
where
    T: Display,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Table<T>
where
    T: Display,
{
    pub fn new() -> Self {
        Table { headers: Vec::new(), rows: Vec::new() }
    }

    /// Add a row, which must have one value per header.
    pub fn add_row(&mut self, row: Vec<T>) -> Result<(), Report> {
        if row.len() != self.headers.len() {
            return Err(eyre!(
                "Row has {} values but the table has {} headers.",
                row.len(),
                self.headers.len()
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Write to a delimited file, the delimiter is chosen from the file extension.
    ///
    /// ```rust
    /// use tsfasta::utils::table::Table;
    /// let mut table = Table::new();
    /// table.headers = vec!["population", "individuals"];
    /// table.add_row(vec!["pop0", "5"])?;
    /// let dir = tempfile::tempdir()?;
    /// let path = dir.path().join("summary.tsv");
    /// table.write(&path)?;
    /// assert_eq!(std::fs::read_to_string(&path)?, "population\tindividuals\npop0\t5\n");
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn write<P>(&self, path: &P) -> Result<(), Report>
    where
        P: AsRef<Path> + Debug,
    {
        let delim = utils::get_delimiter(path)?.to_string();
        utils::create_parent_dir(path)?;
        let mut file =
            File::create(path).wrap_err_with(|| format!("Unable to create file: {path:?}"))?;

        // write headers
        let line = format!("{}\n", self.headers.iter().join(&delim));
        file.write_all(line.as_bytes())
            .wrap_err_with(|| format!("Unable to write table headers: {line}"))?;

        // write regular rows
        for row in &self.rows {
            let line = format!("{}\n", row.iter().join(&delim));
            file.write_all(line.as_bytes())
                .wrap_err_with(|| format!("Unable to write table rows: {line}"))?;
        }

        Ok(())
    }

    /// Convert table to markdown format.
    ///
    /// ```rust
    /// use tsfasta::utils::table::Table;
    /// let mut table = Table::new();
    /// table.headers = vec!["name", "n"];
    /// table.add_row(vec!["NAT", "3"])?;
    /// assert_eq!(table.to_markdown(), "| name | n |\n|------|---|\n| NAT  | 3 |\n");
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn to_markdown(&self) -> String {
        // get the maximum width of each column, +2 to add space on either side
        let col_widths = self
            .headers
            .iter()
            .enumerate()
            .map(|(col_i, header)| {
                let header_width = header.to_string().len();
                self.rows
                    .iter()
                    .filter_map(|row| row.get(col_i))
                    .map(|value| value.to_string().len().max(header_width) + 2)
                    .max()
                    .unwrap_or(header_width + 2)
            })
            .collect_vec();

        let mut markdown = String::from("|");
        // frame in between headers and rows
        let mut header_frame = String::from("|");

        for (header, col_width) in self.headers.iter().zip(col_widths.iter()) {
            markdown.push_str(&format!("{:^width$}|", header.to_string(), width = col_width));
            header_frame.push_str(&format!("{}|", "-".repeat(*col_width)));
        }
        markdown.push('\n');
        markdown.push_str(&header_frame);
        markdown.push('\n');

        for row in &self.rows {
            markdown.push('|');
            for (value, col_width) in row.iter().zip(col_widths.iter()) {
                markdown.push_str(&format!("{:^width$}|", value.to_string(), width = col_width));
            }
            markdown.push('\n');
        }

        markdown
    }
}
