// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The read-only block model the layout consumes.
//!
//! A construct is a [`Block`] whose `components` list other blocks by id. The layout never
//! mutates blocks; hosts rebuild or edit the [`BlockStore`] and lay out again.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;

/// Identifier of a block.
pub type BlockId = String;

/// Fill used for filler blocks: unnamed, uncolored blocks that carry a sequence.
pub const FILLER_COLOR: &str = "#4B505E";

/// Fill used when a block's color is missing.
pub const FALLBACK_COLOR: &str = "lightgray";

/// The default sixteen-entry palette block color indices refer to.
pub const PALETTE: [&str; 16] = [
    "#e7aaa9", "#D28482", "#E9BA9b", "#efac7e", "#EFD79A", "#F1D26C", "#E4E480", "#D3D34F",
    "#9CC6C0", "#6DA19C", "#B1CED0", "#65AAB1", "#8EC78D", "#53B15F", "#C5C4C1", "#A5A6A2",
];

/// True for `#rgb` and `#rrggbb` strings.
pub fn is_hex(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Human readable name of a role symbol, if it is one of the known symbols.
pub fn role_display_name(role: &str) -> Option<&'static str> {
    Some(match role {
        "promoter" => "Promoter",
        "cds" => "CDS",
        "terminator" => "Terminator",
        "operator" => "Operator",
        "insulator" => "Insulator",
        "originReplication" => "Origin of Replication",
        "rbs" => "RBS",
        "protease" => "Protease",
        "ribonuclease" => "Ribonuclease",
        "proteinStability" => "Protein Stability",
        "rnaStability" => "RNA stability",
        "restrictionSite" => "Restriction Site",
        "structural" => "Structural",
        _ => return None,
    })
}

/// A block color: an index into [`PALETTE`] or a literal hex string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColorRef {
    /// Palette index.
    Index(usize),
    /// Literal color; used as is when it is a valid hex string.
    Hex(String),
}

/// Descriptive fields of a block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockMetadata {
    /// User supplied name.
    pub name: Option<String>,
    /// Role symbol, used when the rules carry none.
    pub role: Option<String>,
    /// Color.
    pub color: Option<ColorRef>,
    /// The first bases of the block's sequence, for naming unnamed blocks.
    pub initial_bases: Option<String>,
}

/// Behavioral flags of a block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockRules {
    /// The block is a list of selectable options.
    pub list: bool,
    /// The block is hidden outside authoring mode.
    pub hidden: bool,
    /// The block is fixed; a fixed construct is a template.
    pub fixed: bool,
    /// The block cannot be edited.
    pub frozen: bool,
    /// A template is being authored.
    pub authoring: bool,
    /// Role symbol; takes precedence over the metadata role.
    pub role: Option<String>,
}

/// A block, or a construct when it has components.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Block {
    /// Identifier.
    pub id: BlockId,
    /// Descriptive fields.
    pub metadata: BlockMetadata,
    /// Flags.
    pub rules: BlockRules,
    /// Child blocks, in order.
    pub components: Vec<BlockId>,
    /// List options in order, each with its active flag.
    pub options: Vec<(BlockId, bool)>,
    /// The block has an associated sequence.
    pub has_sequence: bool,
}

impl Block {
    /// An unnamed block with no components.
    pub fn new(id: impl Into<BlockId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.metadata.name = Some(name.into());
        self
    }

    /// Set the role rule.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.rules.role = Some(role.into());
        self
    }

    /// Set the color.
    #[must_use]
    pub fn with_color(mut self, color: ColorRef) -> Self {
        self.metadata.color = Some(color);
        self
    }

    /// Set the components.
    #[must_use]
    pub fn with_components<I, S>(mut self, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<BlockId>,
    {
        self.components = components.into_iter().map(Into::into).collect();
        self
    }

    /// Make this a list block with the given options.
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<BlockId>,
    {
        self.rules.list = true;
        self.options = options.into_iter().map(|(id, on)| (id.into(), on)).collect();
        self
    }

    /// True for a block with components.
    pub fn is_construct(&self) -> bool {
        !self.components.is_empty()
    }

    /// True for a fixed block.
    pub fn is_template(&self) -> bool {
        self.rules.fixed
    }

    /// True for a list block.
    pub fn is_list(&self) -> bool {
        self.rules.list
    }

    /// True when the hidden rule is set.
    pub fn is_hidden(&self) -> bool {
        self.rules.hidden
    }

    /// True when the frozen rule is set.
    pub fn is_frozen(&self) -> bool {
        self.rules.frozen
    }

    /// True when the authoring rule is set.
    pub fn is_authoring(&self) -> bool {
        self.rules.authoring
    }

    /// An unnamed, uncolored block carrying a sequence.
    pub fn is_filler(&self) -> bool {
        self.metadata.name.as_deref().is_none_or(str::is_empty)
            && self.has_sequence
            && self.metadata.color.is_none()
    }

    /// The role symbol, from the rules first and the metadata second.
    pub fn role(&self) -> Option<&str> {
        self.rules.role.as_deref().or(self.metadata.role.as_deref())
    }

    /// `"Template"`, `"List Block"`, `"Filler"` or `"Block"`.
    pub fn kind_name(&self) -> &'static str {
        if self.is_template() {
            "Template"
        } else if self.is_list() {
            "List Block"
        } else if self.is_filler() {
            "Filler"
        } else {
            "Block"
        }
    }

    /// The name to display.
    ///
    /// In order: the user name, the role rule's display name, the first three initial bases
    /// when `prefer_bases` is set or the block is filler, `default`, and finally
    /// `"New <kind>"`.
    pub fn display_name(&self, default: Option<&str>, prefer_bases: bool) -> String {
        if let Some(name) = self.metadata.name.as_deref()
            && !name.is_empty()
        {
            return String::from(name);
        }
        if let Some(role) = self.rules.role.as_deref() {
            return String::from(role_display_name(role).unwrap_or(role));
        }
        if (prefer_bases || self.is_filler())
            && let Some(bases) = self.metadata.initial_bases.as_deref()
        {
            let head: String = bases.chars().take(3).collect();
            return format!("{head}...");
        }
        match default {
            Some(default) => String::from(default),
            None => format!("New {}", self.kind_name()),
        }
    }

    /// Ids of the active list options, in order.
    pub fn active_options(&self) -> impl Iterator<Item = &str> + '_ {
        self.options
            .iter()
            .filter(|(_, active)| *active)
            .map(|(id, _)| id.as_str())
    }

    /// Fill color: filler gray, a literal hex color, a palette entry or light gray.
    pub fn color(&self) -> String {
        if self.is_filler() {
            return String::from(FILLER_COLOR);
        }
        match &self.metadata.color {
            Some(ColorRef::Hex(hex)) if is_hex(hex) => hex.clone(),
            Some(ColorRef::Index(index)) => String::from(PALETTE[index % PALETTE.len()]),
            _ => String::from(FALLBACK_COLOR),
        }
    }
}

/// Blocks by id.
#[derive(Clone, Debug, Default)]
pub struct BlockStore {
    blocks: HashMap<BlockId, Block>,
}

impl BlockStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a block, returning the previous one.
    pub fn insert(&mut self, block: Block) -> Option<Block> {
        self.blocks.insert(block.id.clone(), block)
    }

    /// Remove a block.
    pub fn remove(&mut self, id: &str) -> Option<Block> {
        self.blocks.remove(id)
    }

    /// Look up a block.
    pub fn get(&self, id: &str) -> Option<&Block> {
        self.blocks.get(id)
    }

    /// Look up a block for editing.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Block> {
        self.blocks.get_mut(id)
    }

    /// Look up a block that must exist.
    ///
    /// Panics when the id is unknown; a construct referring to a missing block is malformed.
    pub fn block(&self, id: &str) -> &Block {
        match self.blocks.get(id) {
            Some(block) => block,
            None => panic!("unknown block {id}"),
        }
    }

    /// True if the store holds `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.blocks.contains_key(id)
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True when the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// All blocks, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Block> + '_ {
        self.blocks.values()
    }
}

impl FromIterator<Block> for BlockStore {
    fn from_iter<T: IntoIterator<Item = Block>>(iter: T) -> Self {
        let mut store = Self::new();
        for block in iter {
            store.insert(block);
        }
        store
    }
}
