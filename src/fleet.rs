use crate::ExchangeError;

/// Which group a fleet list belongs to. Lists of the same kind on one board
/// are siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    MainFleet,
    FlagshipPriority,
    FleetSlot,
    Custom,
}

/// Drop behaviour of a single list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListConfig {
    /// `0` means unbounded, `1` makes the list a single slot.
    pub max_items: usize,
    pub allow_internal_move: bool,
    pub allow_same_type_exchange: bool,
    pub unique_in_same_type: bool,
    pub enable_smart_swap: bool,
}

impl ListConfig {
    /// One ship per slot, swapping with sibling slots.
    pub const FLEET_SLOT: ListConfig = ListConfig {
        max_items: 1,
        allow_internal_move: false,
        allow_same_type_exchange: true,
        unique_in_same_type: true,
        enable_smart_swap: true,
    };

    /// Level-1 and level-2 fleets; a ship belongs to at most one of them.
    pub const MAIN_FLEET: ListConfig = ListConfig {
        max_items: 0,
        allow_internal_move: true,
        allow_same_type_exchange: true,
        unique_in_same_type: false,
        enable_smart_swap: true,
    };

    pub const FLAGSHIP_PRIORITY: ListConfig = ListConfig {
        max_items: 0,
        allow_internal_move: true,
        allow_same_type_exchange: false,
        unique_in_same_type: false,
        enable_smart_swap: false,
    };

    pub const CUSTOM: ListConfig = ListConfig {
        max_items: 0,
        allow_internal_move: true,
        allow_same_type_exchange: false,
        unique_in_same_type: false,
        enable_smart_swap: false,
    };

    #[must_use]
    pub fn preset(kind: ListKind) -> ListConfig {
        match kind {
            ListKind::MainFleet => Self::MAIN_FLEET,
            ListKind::FlagshipPriority => Self::FLAGSHIP_PRIORITY,
            ListKind::FleetSlot => Self::FLEET_SLOT,
            ListKind::Custom => Self::CUSTOM,
        }
    }

    #[must_use]
    pub fn is_single_slot(&self) -> bool {
        self.max_items == 1
    }
}

/// Handle to a list on a [`FleetBoard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListId(usize);

impl ListId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Where dropped names come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropSource {
    /// The ship palette; names are copied.
    Palette,
    List(ListId),
}

/// Outcome of an accepted drop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exchange {
    /// Lists whose contents changed, target first.
    pub changed: Vec<ListId>,
    /// Names displaced out of every list.
    pub returned: Vec<String>,
}

impl Exchange {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.changed.is_empty()
    }
}

#[derive(Debug, Clone)]
struct FleetList {
    label: String,
    kind: ListKind,
    config: ListConfig,
    items: Vec<String>,
}

impl FleetList {
    fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|item| item == name)
    }

    fn remove_all(&mut self, names: &[&str]) -> bool {
        let before = self.items.len();
        self.items.retain(|item| !names.contains(&item.as_str()));
        self.items.len() != before
    }
}

/// Registry of the fleet lists shown together in one editor.
///
/// Sibling lookups go through the board, so each list only needs its
/// [`ListKind`] to find the lists it shares ships with.
#[derive(Debug, Clone, Default)]
pub struct FleetBoard {
    lists: Vec<FleetList>,
}

fn dedup_names<'a, S: AsRef<str>>(names: &'a [S]) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.as_ref();
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

impl FleetBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Six single ship slots labelled `1` to `6`.
    #[must_use]
    pub fn fleet_editor() -> Self {
        let mut board = Self::new();
        for slot in 1..=crate::FLEET_SLOTS {
            board.add_list(slot.to_string(), ListKind::FleetSlot);
        }
        board
    }

    /// The decisive battle lists: `level1`, `level2` and `flagship_priority`.
    #[must_use]
    pub fn decisive_battle() -> Self {
        let mut board = Self::new();
        board.add_list("level1", ListKind::MainFleet);
        board.add_list("level2", ListKind::MainFleet);
        board.add_list("flagship_priority", ListKind::FlagshipPriority);
        board
    }

    /// Register a list with the preset configuration for its kind.
    pub fn add_list(&mut self, label: impl Into<String>, kind: ListKind) -> ListId {
        self.add_list_with(label, kind, ListConfig::preset(kind))
    }

    pub fn add_list_with(
        &mut self,
        label: impl Into<String>,
        kind: ListKind,
        config: ListConfig,
    ) -> ListId {
        self.lists.push(FleetList {
            label: label.into(),
            kind,
            config,
            items: Vec::new(),
        });
        ListId(self.lists.len() - 1)
    }

    /// Look a list up by label.
    #[must_use]
    pub fn find(&self, label: &str) -> Option<ListId> {
        self.lists
            .iter()
            .position(|list| list.label == label)
            .map(ListId)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    fn list(&self, id: ListId) -> Result<&FleetList, ExchangeError> {
        self.lists.get(id.0).ok_or(ExchangeError::UnknownList(id.0))
    }

    fn list_mut(&mut self, id: ListId) -> Result<&mut FleetList, ExchangeError> {
        self.lists.get_mut(id.0).ok_or(ExchangeError::UnknownList(id.0))
    }

    /// # Errors
    ///
    /// Returns [`ExchangeError::UnknownList`] for a foreign id.
    pub fn items(&self, id: ListId) -> Result<&[String], ExchangeError> {
        Ok(&self.list(id)?.items)
    }

    /// # Errors
    ///
    /// Returns [`ExchangeError::UnknownList`] for a foreign id.
    pub fn kind(&self, id: ListId) -> Result<ListKind, ExchangeError> {
        Ok(self.list(id)?.kind)
    }

    /// Replace a list's contents, as when loading saved settings. Duplicates
    /// are dropped and the list's capacity is applied.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::UnknownList`] for a foreign id.
    pub fn set_items<S: AsRef<str>>(&mut self, id: ListId, names: &[S]) -> Result<(), ExchangeError> {
        let list = self.list_mut(id)?;
        let mut items: Vec<String> = dedup_names(names).into_iter().map(str::to_owned).collect();
        if list.config.max_items > 0 {
            items.truncate(list.config.max_items);
        }
        list.items = items;
        Ok(())
    }

    /// Lists of the same kind as `id`, excluding `id`.
    #[must_use]
    pub fn siblings(&self, id: ListId) -> Vec<ListId> {
        let Some(kind) = self.lists.get(id.0).map(|l| l.kind) else {
            return Vec::new();
        };
        self.lists
            .iter()
            .enumerate()
            .filter(|(i, list)| *i != id.0 && list.kind == kind)
            .map(|(i, _)| ListId(i))
            .collect()
    }

    fn sibling_holding(&self, id: ListId, name: &str) -> Option<ListId> {
        self.siblings(id)
            .into_iter()
            .find(|sib| self.lists[sib.0].contains(name))
    }

    /// Whether a drop of `names` from `source` onto `target` would be accepted.
    #[must_use]
    pub fn can_accept<S: AsRef<str>>(&self, target: ListId, names: &[S], source: DropSource) -> bool {
        self.check(target, &dedup_names(names), source).is_ok()
    }

    fn check(&self, target: ListId, names: &[&str], source: DropSource) -> Result<(), ExchangeError> {
        if names.is_empty() {
            return Err(ExchangeError::EmptyPayload);
        }
        let list = self.list(target)?;
        match source {
            DropSource::List(src) if src == target => {
                if list.config.allow_internal_move {
                    Ok(())
                } else {
                    Err(ExchangeError::InternalMoveDisabled)
                }
            }
            DropSource::Palette => self.check_palette(target, list, names),
            DropSource::List(src) => self.check_transfer(list, self.list(src)?, names),
        }
    }

    fn check_palette(&self, target: ListId, list: &FleetList, names: &[&str]) -> Result<(), ExchangeError> {
        let config = list.config;
        if !config.enable_smart_swap && config.unique_in_same_type {
            if let Some(name) = names
                .iter()
                .find(|name| self.sibling_holding(target, name).is_some())
            {
                return Err(ExchangeError::InSibling {
                    name: (*name).to_owned(),
                });
            }
        }
        if config.is_single_slot() {
            return if names.len() > 1 {
                Err(ExchangeError::OverCapacity { max: 1 })
            } else {
                Ok(())
            };
        }
        if config.enable_smart_swap {
            let fresh = names.iter().filter(|name| !list.contains(name)).count();
            return check_capacity(list, fresh);
        }
        check_room(list, names)
    }

    fn check_transfer(&self, list: &FleetList, source: &FleetList, names: &[&str]) -> Result<(), ExchangeError> {
        if source.kind != list.kind {
            return Err(ExchangeError::KindMismatch);
        }
        if !list.config.allow_same_type_exchange {
            return Err(ExchangeError::ExchangeDisabled);
        }
        if let Some(name) = names.iter().find(|name| !source.contains(name)) {
            return Err(ExchangeError::NotInSource {
                name: (*name).to_owned(),
            });
        }
        if list.config.is_single_slot() {
            return if names.len() > 1 {
                Err(ExchangeError::OverCapacity { max: 1 })
            } else {
                Ok(())
            };
        }
        check_room(list, names)
    }

    /// Apply a drop of `names` from `source` onto `target`.
    ///
    /// A rejected drop leaves every list untouched.
    ///
    /// # Errors
    ///
    /// Returns the first [`ExchangeError`] that makes the drop unacceptable.
    pub fn exchange_list_contents<S: AsRef<str>>(
        &mut self,
        target: ListId,
        names: &[S],
        source: DropSource,
    ) -> Result<Exchange, ExchangeError> {
        let names = dedup_names(names);
        if let Err(err) = self.check(target, &names, source) {
            tracing::debug!(target = target.0, ?names, ?source, %err, "drop rejected");
            return Err(err);
        }
        let single = self.lists[target.0].config.is_single_slot();
        let exchange = match source {
            // Positions within the list are handled by `reorder`.
            DropSource::List(src) if src == target => Exchange::default(),
            DropSource::Palette if single => self.drop_into_slot(target, names[0]),
            DropSource::Palette => self.drop_into_list(target, &names),
            DropSource::List(src) if single => self.swap_slots(target, src),
            DropSource::List(src) => self.move_between(target, src, &names),
        };
        Ok(exchange)
    }

    fn drop_into_slot(&mut self, target: ListId, name: &str) -> Exchange {
        let occupant = self.lists[target.0].items.first().cloned();
        if occupant.as_deref() == Some(name) {
            return Exchange::default();
        }
        let holder = if self.lists[target.0].config.enable_smart_swap {
            self.sibling_holding(target, name)
        } else {
            None
        };
        self.lists[target.0].items = vec![name.to_owned()];

        let mut exchange = Exchange {
            changed: vec![target],
            returned: Vec::new(),
        };
        match holder {
            Some(holder) => {
                self.lists[holder.0].items = occupant.into_iter().collect();
                exchange.changed.push(holder);
            }
            None => exchange.returned.extend(occupant),
        }
        exchange
    }

    /// Names already held by the target are skipped; with smart swap they
    /// are still taken out of the siblings.
    fn drop_into_list(&mut self, target: ListId, names: &[&str]) -> Exchange {
        let fresh: Vec<String> = names
            .iter()
            .filter(|name| !self.lists[target.0].contains(name))
            .map(|name| (*name).to_owned())
            .collect();
        let mut changed = Vec::new();
        if !fresh.is_empty() {
            changed.push(target);
        }
        if self.lists[target.0].config.enable_smart_swap {
            for sib in self.siblings(target) {
                if self.lists[sib.0].remove_all(names) {
                    changed.push(sib);
                }
            }
        }
        self.lists[target.0].items.extend(fresh);
        Exchange {
            changed,
            returned: Vec::new(),
        }
    }

    fn swap_slots(&mut self, target: ListId, source: ListId) -> Exchange {
        let incoming = std::mem::take(&mut self.lists[source.0].items);
        let outgoing = std::mem::replace(&mut self.lists[target.0].items, incoming);
        self.lists[source.0].items = outgoing;
        Exchange {
            changed: vec![target, source],
            returned: Vec::new(),
        }
    }

    fn move_between(&mut self, target: ListId, source: ListId, names: &[&str]) -> Exchange {
        self.lists[source.0].remove_all(names);
        let mut changed = vec![target, source];
        if self.lists[target.0].config.enable_smart_swap {
            for sib in self.siblings(target) {
                if sib != source && self.lists[sib.0].remove_all(names) {
                    changed.push(sib);
                }
            }
        }
        self.lists[target.0]
            .items
            .extend(names.iter().map(|name| (*name).to_owned()));
        Exchange {
            changed,
            returned: Vec::new(),
        }
    }

    /// Move the entry at `from` to position `to` within one list.
    ///
    /// # Errors
    ///
    /// Fails when the list forbids internal moves or an index is out of range.
    pub fn reorder(&mut self, target: ListId, from: usize, to: usize) -> Result<bool, ExchangeError> {
        let list = self.list_mut(target)?;
        if !list.config.allow_internal_move {
            return Err(ExchangeError::InternalMoveDisabled);
        }
        let len = list.items.len();
        if let Some(index) = [from, to].into_iter().find(|&i| i >= len) {
            return Err(ExchangeError::OutOfRange { index, len });
        }
        if from == to {
            return Ok(false);
        }
        let item = list.items.remove(from);
        list.items.insert(to, item);
        Ok(true)
    }

    /// Remove `names` from `source`, as when they are dragged back onto the
    /// palette. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::UnknownList`] for a foreign id.
    pub fn return_to_palette<S: AsRef<str>>(&mut self, source: ListId, names: &[S]) -> Result<bool, ExchangeError> {
        let names = dedup_names(names);
        Ok(self.list_mut(source)?.remove_all(&names))
    }

    /// Remove `name` from every list, returning the lists that changed.
    pub fn remove_everywhere(&mut self, name: &str) -> Vec<ListId> {
        self.lists
            .iter_mut()
            .enumerate()
            .filter_map(|(i, list)| list.remove_all(&[name]).then_some(ListId(i)))
            .collect()
    }
}

fn check_room(list: &FleetList, names: &[&str]) -> Result<(), ExchangeError> {
    if let Some(name) = names.iter().find(|name| list.contains(name)) {
        return Err(ExchangeError::AlreadyPresent {
            name: (*name).to_owned(),
        });
    }
    check_capacity(list, names.len())
}

fn check_capacity(list: &FleetList, incoming: usize) -> Result<(), ExchangeError> {
    let max = list.config.max_items;
    if max > 0 && list.items.len() + incoming > max {
        return Err(ExchangeError::OverCapacity { max });
    }
    Ok(())
}
