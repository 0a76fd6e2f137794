//! Deterministic selection of mutations to apply.
//!
//! Given the parsed rows and a resolved seed, the selector draws a target
//! count, samples distinct row indices, expands grouped rows (leaders pull
//! in their nested children, synced children reuse the leader's
//! permutation index), partitions the result by negation mode, and orders
//! the final list by spec line, descending.

use crate::errors::{Error, Result};
use crate::rng::{ChaChaRng, Seed};
use crate::spec::{PossibleMutation, SelectedMutation};
use crate::text::{last_non_whitespace, whitespace_width};
use crate::warnings::Warnings;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Selector configuration, resolved from CLI options.
#[derive(Debug, Clone, Default)]
pub struct SelectorConfig {
    pub count: Option<u32>,
    pub min_count: Option<u32>,
    pub max_count: Option<u32>,
    pub seed: Option<Seed>,
    /// Mirror selection status messages to stderr.
    pub verbose: bool,
}

/// Outcome of a selection run: the chosen mutations (line-descending), the
/// seed that drove them, and the count that was drawn or clamped.
#[derive(Debug)]
pub struct Selection {
    pub mutations: Vec<SelectedMutation>,
    pub seed: Seed,
    pub count: u32,
}

/// Runs selection over `rows`, writing `group_number` annotations in place.
pub fn select_mutations(
    rows: &mut [PossibleMutation],
    config: &SelectorConfig,
    warnings: &mut Warnings,
) -> Result<Selection> {
    let seed = match config.seed {
        Some(seed) => {
            info!(seed = %seed.to_hex(), "using provided seed");
            if config.verbose {
                eprintln!("Using provided seed: {}", seed.to_hex());
            }
            seed
        }
        None => {
            let seed = Seed::generate();
            info!(seed = %seed.to_hex(), "using generated seed");
            if config.verbose {
                eprintln!("Using generated seed: {}", seed.to_hex());
            }
            seed
        }
    };
    let mut rng = ChaChaRng::from_seed(seed.as_bytes());

    let total = rows.len() as u32;
    let count = resolve_count(config, total, &mut rng, warnings)?;

    let mut indexes = BTreeSet::new();
    while indexes.len() < count as usize {
        indexes.insert(rng.bounded(0, total) as usize);
    }
    let selected_indexes: Vec<usize> = indexes.into_iter().collect();

    let mutations = expand_selection(rows, &selected_indexes, &mut rng)?;

    info!(
        selected = mutations.len(),
        "possible mutations have been selected"
    );
    if config.verbose {
        eprintln!("{} possible mutations have been selected", mutations.len());
    }

    Ok(Selection {
        mutations,
        seed,
        count,
    })
}

fn resolve_count(
    config: &SelectorConfig,
    total: u32,
    rng: &mut ChaChaRng,
    warnings: &mut Warnings,
) -> Result<u32> {
    if let Some(requested) = config.count {
        let clamped = requested.min(total);
        if requested > total {
            warnings.add_note(format!(
                "--count=NUMBER entered exceeded possible amount contained in TSV, \
                 maximum available count of {clamped} from TSV was instead used."
            ));
        }
        return Ok(clamped);
    }
    let min = config.min_count.unwrap_or(1);
    let max = config.max_count.unwrap_or(total + 1);
    if min >= max {
        return Err(Error::InvalidArgument(format!(
            "--min-count ({min}) must be less than the effective --max-count ({max})"
        )));
    }
    Ok(rng.bounded(min, max))
}

fn expand_selection(
    rows: &mut [PossibleMutation],
    selected_indexes: &[usize],
    rng: &mut ChaChaRng,
) -> Result<Vec<SelectedMutation>> {
    let mut walker = GroupWalker {
        rows,
        rng,
        // Group numbers start at 1; slot 0 is a placeholder so that
        // leader_perm_indexes[group_number] addresses directly.
        leader_perm_indexes: vec![0],
        next_group_number: 0,
        selected: Vec::new(),
    };

    let negated = match selected_indexes.first() {
        Some(&first) => walker.rows[first].flags.must_pass,
        None => return Ok(Vec::new()),
    };

    for &i in selected_indexes {
        if walker.selected.len() >= selected_indexes.len() {
            break;
        }
        walker.visit(i)?;
    }

    let mut mutations: Vec<SelectedMutation> = walker
        .selected
        .into_iter()
        .filter(|sm| sm.flags.must_pass == negated)
        .collect();
    mutations.sort_by(|a, b| b.flags.line_number.cmp(&a.flags.line_number));
    Ok(mutations)
}

struct GroupWalker<'a> {
    rows: &'a mut [PossibleMutation],
    rng: &'a mut ChaChaRng,
    leader_perm_indexes: Vec<usize>,
    next_group_number: usize,
    selected: Vec<SelectedMutation>,
}

impl GroupWalker<'_> {
    fn visit(&mut self, i: usize) -> Result<()> {
        if self.rows[i].flags.group_number > 0 {
            return Ok(());
        }
        if self.rows[i].flags.depth == 0 {
            let k = self.random_perm_index(i);
            self.emit(i, k);
            return Ok(());
        }

        let mut leader = i;
        while self.rows[leader].flags.depth != 1 {
            leader = leader.checked_sub(1).ok_or_else(|| {
                Error::Internal(format!(
                    "nested row at spec line {} has no group leader",
                    self.rows[i].flags.line_number
                ))
            })?;
        }

        let existing = self.rows[leader].flags.group_number;
        if existing > 0 {
            self.add_nested_line(i, existing);
        } else {
            let group = self.add_new_group(leader);
            if leader != i && self.rows[i].flags.group_number == 0 {
                self.add_nested_line(i, group);
            }
        }
        Ok(())
    }

    /// Opens a new group at `leader`: draws the leader's permutation index
    /// (remembered for synced children), then sweeps forward through the
    /// nested block. Optional rows close the gate for everything below
    /// them until the walk returns to depth 2.
    fn add_new_group(&mut self, leader: usize) -> usize {
        self.next_group_number += 1;
        let group = self.next_group_number;
        self.rows[leader].flags.group_number = group;

        let leader_index = self.random_perm_index(leader);
        self.leader_perm_indexes.push(leader_index);
        debug_assert_eq!(self.leader_perm_indexes.len(), group + 1);
        self.emit(leader, leader_index);

        let mut it = leader;
        let mut ok_to_add = true;
        while it + 1 < self.rows.len() && self.rows[it + 1].flags.depth > 1 {
            it += 1;
            if self.rows[it].flags.depth == 2 {
                ok_to_add = true;
            }
            if self.rows[it].flags.is_optional {
                ok_to_add = false;
            }
            if ok_to_add {
                self.grouped_select(it, group);
            }
        }
        group
    }

    /// Attaches a directly-selected nested row to an existing group, then
    /// greedily pulls in non-optional ungrouped ancestors above it and
    /// non-optional ungrouped deeper descendants below it.
    fn add_nested_line(&mut self, i: usize, group: usize) {
        self.grouped_select(i, group);

        let mut up = i;
        while up > 0
            && self.rows[up - 1].flags.group_number == 0
            && !self.rows[up - 1].flags.is_optional
            && self.rows[up - 1].flags.depth < self.rows[up].flags.depth
        {
            up -= 1;
            self.grouped_select(up, group);
        }

        let mut down = i;
        while down + 1 < self.rows.len()
            && self.rows[down + 1].flags.group_number == 0
            && !self.rows[down + 1].flags.is_optional
            && self.rows[down + 1].flags.depth > self.rows[down].flags.depth
        {
            down += 1;
            self.grouped_select(down, group);
        }
    }

    fn grouped_select(&mut self, i: usize, group: usize) {
        self.rows[i].flags.group_number = group;
        if self.rows[i].flags.is_index_synced {
            self.emit(i, self.leader_perm_indexes[group]);
        } else {
            let k = self.random_perm_index(i);
            self.emit(i, k);
        }
    }

    fn random_perm_index(&mut self, i: usize) -> usize {
        self.rng.bounded(0, self.rows[i].permutations.len() as u32) as usize
    }

    /// Emits row `i` with permutation `index` (saturated for synced rows
    /// that carry fewer permutations than their leader), trimming the
    /// pattern: sigil prefix stripped, surrounding whitespace removed.
    fn emit(&mut self, i: usize, index: usize) {
        let row = &self.rows[i];
        let index = index.min(row.permutations.len() - 1);
        let bytes = row.pattern.as_bytes();

        let mut offset = row.flags.prefix_len();
        loop {
            let w = whitespace_width(bytes, offset);
            if w == 0 {
                break;
            }
            offset += w;
        }
        let end = match last_non_whitespace(bytes) {
            Some(last) => last + 1,
            None => bytes.len(),
        };
        let start = offset.min(bytes.len());
        let stop = end.clamp(start, bytes.len());

        debug!(
            line = row.flags.line_number,
            depth = row.flags.depth,
            group = row.flags.group_number,
            synced = row.flags.is_index_synced,
            "selected row"
        );

        self.selected.push(SelectedMutation {
            pattern: row.pattern[start..stop].to_string(),
            replacement: row.permutations[index].clone(),
            flags: row.flags,
        });
    }
}
