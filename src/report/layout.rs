//! Column width estimation.
//!
//! Widths come from character counts only, never from font metrics, so the
//! same table always gets the same layout. They are emitted as fractions of
//! the printable width, so the table never runs off the page whatever the
//! paper size.

/// Width rules for the three column roles, in points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnWidthRules {
    pub id_width: u32,
    pub name_min: u32,
    pub name_max: u32,
    pub other_width: u32,
    pub points_per_char: u32,
    /// Widths used when there are no rows at all.
    pub empty_default: [u32; 3],
}

impl Default for ColumnWidthRules {
    fn default() -> Self {
        Self {
            id_width: 80,
            name_min: 100,
            name_max: 250,
            other_width: 100,
            points_per_char: 5,
            empty_default: [100, 200, 100],
        }
    }
}

/// One width per column, in points; used as relative weights when rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub widths: Vec<u32>,
}

impl ColumnLayout {
    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Typst `columns:` argument, e.g. `(80fr, 200fr, 100fr)`.
    pub fn to_typst(&self) -> String {
        let parts: Vec<String> = self.widths.iter().map(|w| format!("{w}fr")).collect();
        // A one-element Typst array needs a trailing comma.
        if parts.len() == 1 {
            format!("({},)", parts[0])
        } else {
            format!("({})", parts.join(", "))
        }
    }
}

/// Compute column widths from every row, header included.
pub fn estimate_column_widths(rows: &[Vec<String>], rules: &ColumnWidthRules) -> ColumnLayout {
    if rows.is_empty() {
        return ColumnLayout {
            widths: rules.empty_default.to_vec(),
        };
    }

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths = (0..columns)
        .map(|col| match col {
            0 => rules.id_width,
            1 => {
                let longest = rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(|cell| cell.chars().count() as u32)
                    .max()
                    .unwrap_or(0);
                longest
                    .saturating_mul(rules.points_per_char)
                    .clamp(rules.name_min, rules.name_max)
            }
            _ => rules.other_width,
        })
        .collect();

    ColumnLayout { widths }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_empty_rows_use_default() {
        let layout = estimate_column_widths(&[], &ColumnWidthRules::default());
        assert_eq!(layout.widths, vec![100, 200, 100]);
    }

    #[test]
    fn test_name_column_scales_with_content() {
        let rows = vec![
            row(&["ID", "Камера", "Дата"]),
            row(&["1", &"x".repeat(30), "05.03.2024 09:05"]),
        ];
        let layout = estimate_column_widths(&rows, &ColumnWidthRules::default());
        assert_eq!(layout.widths, vec![80, 150, 100]);
    }

    #[test]
    fn test_name_column_clamped() {
        let short = vec![row(&["1", "a", "b"])];
        let long = vec![row(&["1", &"y".repeat(500), "b"])];
        let rules = ColumnWidthRules::default();
        assert_eq!(estimate_column_widths(&short, &rules).widths[1], 100);
        assert_eq!(estimate_column_widths(&long, &rules).widths[1], 250);
    }

    #[test]
    fn test_extra_columns_get_constant_width() {
        let rows = vec![row(&["1", "a", "b", "c", "d"])];
        let layout = estimate_column_widths(&rows, &ColumnWidthRules::default());
        assert_eq!(layout.widths, vec![80, 100, 100, 100, 100]);
    }

    #[test]
    fn test_to_typst() {
        let layout = ColumnLayout {
            widths: vec![80, 200, 100],
        };
        assert_eq!(layout.to_typst(), "(80fr, 200fr, 100fr)");
        let single = ColumnLayout { widths: vec![80] };
        assert_eq!(single.to_typst(), "(80fr,)");
    }
}
