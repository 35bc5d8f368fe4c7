use crate::config::MatchConfig;
use crate::dom::{ElementId, HostDocument};
use crate::style::{BoxSizing, clear_property, format_px, parse_px, vertical_insets};

/// Tops within this distance of a row's first (minimum) top belong to the
/// same visual row.
pub const ROW_TOLERANCE: f64 = 1.0;

/// Per-pass measurement of one element. Rebuilt fresh on every pass and
/// discarded at its end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowItem {
    pub element: ElementId,
    /// Viewport-relative top edge minus the element's own top margin.
    /// Forced to zero when row partitioning is disabled.
    pub top: f64,
    /// Raw bounding-box height at measurement time (padding and border
    /// included, margin not).
    pub height: f64,
}

/// Outcome counters for one reconciled target set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowStats {
    pub rows: usize,
    pub singleton_rows: usize,
    pub writes: usize,
    pub resets: usize,
}

impl RowStats {
    pub fn absorb(&mut self, other: &RowStats) {
        self.rows += other.rows;
        self.singleton_rows += other.singleton_rows;
        self.writes += other.writes;
        self.resets += other.resets;
    }
}

/// Equalize one target set.
///
/// Clears any previously-applied dimension up front so stale values never
/// pollute measurement, partitions the set into visual rows by adjusted
/// top offset, then writes each row's target dimension back through the
/// host (discounting vertical insets for content-box members). Singleton
/// rows are reset rather than written; excluded members receive the write
/// and are immediately reset.
pub fn reconcile(
    host: &mut dyn HostDocument,
    elements: &[ElementId],
    config: &MatchConfig,
) -> RowStats {
    let mut stats = RowStats::default();
    if elements.is_empty() {
        return stats;
    }

    for &element in elements {
        clear_property(host, element, &config.property);
    }

    let items = measure(host, elements, config.by_row);
    let rows = partition_rows(items);
    stats.rows = rows.len();

    for row in &rows {
        let target_height = match config.target {
            // The external target bypasses voting entirely; measured fresh
            // per row so late layout shifts are picked up.
            Some(target) => host.bounding_box(target).height,
            None => {
                if row.len() == 1 {
                    clear_property(host, row[0].element, &config.property);
                    stats.singleton_rows += 1;
                    stats.resets += 1;
                    continue;
                }
                // Excluded members still vote; exclusion only affects the
                // write-back below.
                row.iter().map(|item| item.height).fold(0.0, f64::max)
            }
        };

        for item in row {
            if config.target == Some(item.element) {
                continue;
            }
            let value = match BoxSizing::of(host, item.element) {
                BoxSizing::BorderBox => target_height,
                BoxSizing::ContentBox => target_height - vertical_insets(host, item.element),
            };
            host.set_style_property(item.element, &config.property, &format_px(value));
            stats.writes += 1;
            if config.is_excluded(item.element) {
                clear_property(host, item.element, &config.property);
                stats.resets += 1;
            }
        }
    }

    stats
}

fn measure(host: &dyn HostDocument, elements: &[ElementId], by_row: bool) -> Vec<RowItem> {
    elements
        .iter()
        .map(|&element| {
            let rect = host.bounding_box(element);
            let top = if by_row {
                rect.top - parse_px(&host.computed_style(element, "margin-top"))
            } else {
                0.0
            };
            RowItem {
                element,
                top,
                height: rect.height,
            }
        })
        .collect()
}

/// Partition measured items into visual rows.
///
/// Items are sorted by adjusted top; a new row starts whenever an item's
/// top differs from the running row's first top by a whole pixel or more.
fn partition_rows(mut items: Vec<RowItem>) -> Vec<Vec<RowItem>> {
    items.sort_by(|a, b| a.top.total_cmp(&b.top));

    let mut rows: Vec<Vec<RowItem>> = Vec::new();
    for item in items {
        match rows.last_mut() {
            Some(row) if (item.top - row[0].top).abs().floor() < ROW_TOLERANCE => {
                row.push(item);
            }
            _ => rows.push(vec![item]),
        }
    }
    rows
}
