pub mod item;
pub mod query;
pub mod summarizer;

pub use item::{ItemType, ParentLink, Relationship};
pub use query::{
	Aggregation, BoolQuery, GeoRelation, GeoShape, Query, SearchRequest, SourceFilter,
};
