use crate::columns::descriptor::{
    CellPolicy, CellRenderer, ColumnDescriptor, ColumnOverride, DisplayTokens, HeaderContent,
};
use crate::columns::temporal_toggle::ColumnFormattingState;
use crate::data::datatable::{DataRow, GenericDataType};
use crate::services::{MarkupRenderer, TimeFormatter};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::trace;

/// Scalar inputs of a descriptor build
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnInputs {
    /// Requested columns, in display order
    pub columns: Vec<String>,
    /// Aligned with `columns` by position
    pub column_types: Vec<GenericDataType>,
    pub data_source: Option<String>,
    pub visible: bool,
    pub allow_html: bool,
}

struct MemoState {
    inputs: ColumnInputs,
    rows: Arc<Vec<DataRow>>,
    preference_generation: u64,
    overrides_generation: u64,
    descriptors: Vec<ColumnDescriptor>,
}

/// Derives column descriptors and caches them until an input changes.
///
/// Rows are compared by `Arc` identity, preferences and overrides by their
/// generation counters, everything else by value.
pub struct ColumnDescriptorBuilder {
    tokens: Arc<DisplayTokens>,
    time_formatter: Arc<dyn TimeFormatter>,
    markup: Arc<dyn MarkupRenderer>,
    overrides: HashMap<String, ColumnOverride>,
    overrides_generation: u64,
    cache: Option<MemoState>,
    recompute_count: usize,
}

/// `id` if unused, otherwise `id_<position>` (then `id_<position>_<n>`)
fn unique_id(used: &mut HashSet<String>, id: &str, position: usize) -> String {
    let mut candidate = id.to_string();
    let mut attempt = 0;
    while used.contains(&candidate) {
        candidate = if attempt == 0 {
            format!("{}_{}", id, position)
        } else {
            format!("{}_{}_{}", id, position, attempt)
        };
        attempt += 1;
    }
    used.insert(candidate.clone());
    candidate
}

impl ColumnDescriptorBuilder {
    pub fn new(
        tokens: DisplayTokens,
        time_formatter: Arc<dyn TimeFormatter>,
        markup: Arc<dyn MarkupRenderer>,
    ) -> Self {
        Self {
            tokens: Arc::new(tokens),
            time_formatter,
            markup,
            overrides: HashMap::new(),
            overrides_generation: 0,
            cache: None,
            recompute_count: 0,
        }
    }

    /// Replace the per-column overrides (keyed by column name)
    pub fn set_overrides(&mut self, overrides: HashMap<String, ColumnOverride>) {
        self.overrides = overrides;
        self.overrides_generation += 1;
    }

    pub fn set_override(&mut self, column: impl Into<String>, column_override: ColumnOverride) {
        self.overrides.insert(column.into(), column_override);
        self.overrides_generation += 1;
    }

    /// How many times descriptors were actually derived
    pub fn recompute_count(&self) -> usize {
        self.recompute_count
    }

    pub fn build(
        &mut self,
        inputs: &ColumnInputs,
        rows: &Arc<Vec<DataRow>>,
        formatting: &ColumnFormattingState,
    ) -> &[ColumnDescriptor] {
        let fresh = matches!(
            &self.cache,
            Some(memo) if memo.inputs == *inputs
                && Arc::ptr_eq(&memo.rows, rows)
                && memo.preference_generation == formatting.generation()
                && memo.overrides_generation == self.overrides_generation
        );

        if !fresh {
            let descriptors = self.derive(inputs, rows, formatting);
            self.recompute_count += 1;
            trace!(target: "columns", "Derived {} column descriptors", descriptors.len());
            self.cache = Some(MemoState {
                inputs: inputs.clone(),
                rows: Arc::clone(rows),
                preference_generation: formatting.generation(),
                overrides_generation: self.overrides_generation,
                descriptors,
            });
        }

        match &self.cache {
            Some(memo) => &memo.descriptors,
            None => &[],
        }
    }

    fn derive(
        &self,
        inputs: &ColumnInputs,
        rows: &[DataRow],
        formatting: &ColumnFormattingState,
    ) -> Vec<ColumnDescriptor> {
        // Columns are matched against the first row; no data, no columns
        let Some(first_row) = rows.first() else {
            return Vec::new();
        };

        let mut used_ids = HashSet::new();
        inputs
            .columns
            .iter()
            .enumerate()
            .filter(|(_, name)| first_row.contains_key(name))
            .map(|(idx, name)| {
                let data_type = inputs.column_types.get(idx).copied();
                let is_temporal = data_type == Some(GenericDataType::Temporal);

                // Only raw (non-string) temporal values can be toggled
                let first_is_string = first_row.get(name).is_some_and(|v| v.is_string());
                let header = if is_temporal && !first_is_string && inputs.data_source.is_some() {
                    HeaderContent::TemporalToggle {
                        column: name.clone(),
                        mode: formatting.mode_of(name),
                    }
                } else {
                    HeaderContent::Plain(name.clone())
                };

                let mut descriptor = ColumnDescriptor {
                    id: if name.is_empty() {
                        idx.to_string()
                    } else {
                        name.clone()
                    },
                    accessor: name.clone(),
                    header,
                    cell: CellRenderer::Policy(CellPolicy {
                        data_type,
                        original: formatting.is_original(name),
                        allow_html: inputs.allow_html,
                        tokens: Arc::clone(&self.tokens),
                        time_formatter: Arc::clone(&self.time_formatter),
                        markup: Arc::clone(&self.markup),
                    }),
                };

                if let Some(column_override) = self.overrides.get(name) {
                    column_override.apply(&mut descriptor);
                }
                descriptor.id = unique_id(&mut used_ids, &descriptor.id, idx);
                descriptor
            })
            .collect()
    }
}
