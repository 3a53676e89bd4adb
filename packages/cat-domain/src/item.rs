use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Catalog entity kinds, ordered from the root of the hierarchy to its leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
	#[serde(rename = "iudx:Owner")]
	Owner,
	#[serde(rename = "iudx:COS")]
	Cos,
	#[serde(rename = "iudx:ResourceServer")]
	ResourceServer,
	#[serde(rename = "iudx:Provider")]
	Provider,
	#[serde(rename = "iudx:ResourceGroup")]
	ResourceGroup,
	#[serde(rename = "iudx:Resource")]
	Resource,
}
impl ItemType {
	pub const ALL: [Self; 6] = [
		Self::Owner,
		Self::Cos,
		Self::ResourceServer,
		Self::Provider,
		Self::ResourceGroup,
		Self::Resource,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Owner => "iudx:Owner",
			Self::Cos => "iudx:COS",
			Self::ResourceServer => "iudx:ResourceServer",
			Self::Provider => "iudx:Provider",
			Self::ResourceGroup => "iudx:ResourceGroup",
			Self::Resource => "iudx:Resource",
		}
	}

	pub fn from_tag(tag: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|item_type| item_type.as_str() == tag)
	}

	/// Picks the canonical type out of a document's type-tag list.
	///
	/// Tags outside the catalog vocabulary (schema classes such as `iudx:EnvAQM`) are ignored.
	/// The first recognized tag wins.
	pub fn from_tags<S>(tags: &[S]) -> Option<Self>
	where
		S: AsRef<str>,
	{
		tags.iter().find_map(|tag| Self::from_tag(tag.as_ref()))
	}

	/// The field under which descendants reference an item of this type.
	pub fn as_parent_link(self) -> Option<ParentLink> {
		match self {
			Self::Owner => Some(ParentLink::Owner),
			Self::Cos => Some(ParentLink::Cos),
			Self::ResourceServer => Some(ParentLink::ResourceServer),
			Self::Provider => Some(ParentLink::Provider),
			Self::ResourceGroup => Some(ParentLink::ResourceGroup),
			Self::Resource => None,
		}
	}

	pub fn parent_links(self) -> &'static [ParentLink] {
		match self {
			Self::Owner => &[],
			Self::Cos => &[ParentLink::Owner],
			Self::ResourceServer => &[ParentLink::Cos, ParentLink::Owner],
			Self::Provider => &[ParentLink::ResourceServer, ParentLink::Cos],
			Self::ResourceGroup => &[ParentLink::Provider, ParentLink::ResourceServer, ParentLink::Cos],
			Self::Resource => &[
				ParentLink::ResourceGroup,
				ParentLink::Provider,
				ParentLink::ResourceServer,
				ParentLink::Cos,
			],
		}
	}
}
impl Display for ItemType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Document fields that point at an ancestor item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentLink {
	Owner,
	Cos,
	ResourceServer,
	Provider,
	ResourceGroup,
}
impl ParentLink {
	pub fn field(self) -> &'static str {
		match self {
			Self::Owner => "owner",
			Self::Cos => "cos",
			Self::ResourceServer => "resourceServer",
			Self::Provider => "provider",
			Self::ResourceGroup => "resourceGroup",
		}
	}

	pub fn keyword_field(self) -> String {
		format!("{}.keyword", self.field())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Relationship {
	Resource,
	ResourceGroup,
	Provider,
	ResourceServer,
	Cos,
	All,
	Type,
}
impl Relationship {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"resource" => Some(Self::Resource),
			"resourceGroup" => Some(Self::ResourceGroup),
			"provider" => Some(Self::Provider),
			"resourceServer" => Some(Self::ResourceServer),
			"type" => Some(Self::Type),
			_ if raw.eq_ignore_ascii_case("cos") => Some(Self::Cos),
			_ if raw.eq_ignore_ascii_case("all") => Some(Self::All),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Resource => "resource",
			Self::ResourceGroup => "resourceGroup",
			Self::Provider => "provider",
			Self::ResourceServer => "resourceServer",
			Self::Cos => "cos",
			Self::All => "all",
			Self::Type => "type",
		}
	}

	/// The item type this relationship walks to, when it names one.
	pub fn target_type(self) -> Option<ItemType> {
		match self {
			Self::Resource => Some(ItemType::Resource),
			Self::ResourceGroup => Some(ItemType::ResourceGroup),
			Self::Provider => Some(ItemType::Provider),
			Self::ResourceServer => Some(ItemType::ResourceServer),
			Self::Cos => Some(ItemType::Cos),
			Self::All | Self::Type => None,
		}
	}

	/// Compatibility table between a relationship and the type of the item it starts from.
	///
	/// Self-relationships are never allowed. `all` is rejected on a COS because a COS has no
	/// ancestors inside the catalogue index. An Owner only answers `type`.
	pub fn is_allowed_on(self, item_type: ItemType) -> bool {
		if item_type == ItemType::Owner {
			return self == Self::Type;
		}
		if self.target_type() == Some(item_type) {
			return false;
		}

		!(self == Self::All && item_type == ItemType::Cos)
	}
}
impl Display for Relationship {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
