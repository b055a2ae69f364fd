//! Graph builder: the adapter between the file index and the graph store.
//!
//! The indexing/tagging collaborator hands over plain facts - file records
//! with an optional project and tags, plus file-to-file co-occurrence links
//! - and the builder turns them into nodes and weighted edges. It is the
//! only component that knows the managed relationship vocabulary
//! (`belongs_to`, `tagged_with`, `related_to`).
//!
//! # Rebuild contract
//!
//! [`GraphBuilder::rebuild`] first deletes every edge of the managed kinds,
//! then ingests the supplied facts. Because edge weights accumulate, a
//! rebuild that did not reset would double every weight on unchanged input;
//! the reset makes `rebuild` idempotent. Edges of any other type, all nodes,
//! and all node handles survive a rebuild untouched.

use crate::models::{Direction, EdgeKind, EntityKind, Neighbor};
use crate::services::FileGraph;
use crate::storage::{GraphStats, GraphStore};
use crate::Result;
use tracing::info;

/// One file record from the external index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileRecord {
    /// Stable file id assigned by the indexer.
    pub file_id: String,
    /// Filename, used as the node label.
    pub filename: String,
    /// Project the file belongs to, if assigned.
    pub project: Option<String>,
    /// Tags assigned by the AI tagger or the user.
    pub tags: Vec<String>,
}

impl FileRecord {
    /// Creates a record with no project or tags.
    #[must_use]
    pub fn new(file_id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            filename: filename.into(),
            project: None,
            tags: Vec::new(),
        }
    }

    /// Sets the project.
    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Adds multiple tags.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

/// A file-to-file co-occurrence observation from the external index.
#[derive(Debug, Clone, PartialEq)]
pub struct FileLink {
    /// First file id.
    pub from_file: String,
    /// Second file id.
    pub to_file: String,
    /// Observed co-occurrence strength; becomes the edge weight delta.
    pub strength: f64,
}

impl FileLink {
    /// Creates a link between two files.
    #[must_use]
    pub fn new(
        from_file: impl Into<String>,
        to_file: impl Into<String>,
        strength: f64,
    ) -> Self {
        Self {
            from_file: from_file.into(),
            to_file: to_file.into(),
            strength,
        }
    }
}

/// Builds the relationship graph from external file facts.
///
/// # Example
///
/// ```rust,ignore
/// use filegraph::{FileGraph, FileRecord, FileLink, GraphBuilder, InMemoryGraphStore};
///
/// let graph = FileGraph::new(InMemoryGraphStore::new());
/// let builder = GraphBuilder::new(graph.clone());
///
/// let stats = builder.rebuild(
///     vec![FileRecord::new("1", "invoice.pdf").with_project("Acme")],
///     vec![FileLink::new("1", "2", 0.8)],
/// )?;
/// ```
pub struct GraphBuilder<S: GraphStore> {
    graph: FileGraph<S>,
}

impl<S: GraphStore> GraphBuilder<S> {
    /// Creates a builder over the given graph service.
    pub const fn new(graph: FileGraph<S>) -> Self {
        Self { graph }
    }

    /// Returns a reference to the underlying graph service.
    #[must_use]
    pub const fn graph(&self) -> &FileGraph<S> {
        &self.graph
    }

    /// Rebuilds the managed portion of the graph from file facts.
    ///
    /// Resets the managed edge kinds, then for each file record ensures the
    /// file node (labelled with the filename) and observes `belongs_to` /
    /// `tagged_with` edges with a weight delta of 1; for each link observes
    /// a `related_to` edge carrying the link strength. Node metadata is
    /// refreshed in place and handles never change.
    ///
    /// Returns the post-rebuild statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if any storage operation fails; facts after the
    /// failing one are not applied.
    pub fn rebuild(
        &self,
        files: impl IntoIterator<Item = FileRecord>,
        links: impl IntoIterator<Item = FileLink>,
    ) -> Result<GraphStats> {
        let managed: Vec<&str> = EdgeKind::all().iter().map(|k| k.as_str()).collect();
        let cleared = self.graph.store().clear_edges_of_kinds(&managed)?;

        let file_type = EntityKind::File.as_str();
        let mut file_count = 0usize;
        for record in files {
            file_count += 1;
            self.graph
                .ensure_node(file_type, &record.file_id, Some(&record.filename), None)?;

            if let Some(project) = &record.project {
                self.graph.ensure_node(
                    EntityKind::Project.as_str(),
                    project,
                    Some(project),
                    None,
                )?;
                self.graph.observe_edge(
                    file_type,
                    &record.file_id,
                    EntityKind::Project.as_str(),
                    project,
                    EdgeKind::BelongsTo.as_str(),
                    1.0,
                    None,
                )?;
            }

            for tag in record.tags.iter().filter(|t| !t.is_empty()) {
                self.graph
                    .ensure_node(EntityKind::Tag.as_str(), tag, Some(tag), None)?;
                self.graph.observe_edge(
                    file_type,
                    &record.file_id,
                    EntityKind::Tag.as_str(),
                    tag,
                    EdgeKind::TaggedWith.as_str(),
                    1.0,
                    None,
                )?;
            }
        }

        let mut link_count = 0usize;
        for link in links {
            link_count += 1;
            self.graph.observe_edge(
                file_type,
                &link.from_file,
                file_type,
                &link.to_file,
                EdgeKind::RelatedTo.as_str(),
                link.strength,
                None,
            )?;
        }

        let stats = self.graph.stats()?;
        info!(
            files = file_count,
            links = link_count,
            cleared_edges = cleared,
            total_nodes = stats.total_nodes,
            total_edges = stats.total_edges,
            "rebuilt relationship graph"
        );
        Ok(stats)
    }

    /// Returns every file connected to a project.
    ///
    /// # Errors
    ///
    /// Returns an error if a store read fails.
    pub fn files_in_project(&self, project: &str) -> Result<Vec<Neighbor>> {
        let neighbors = self.graph.neighbors(
            EntityKind::Project.as_str(),
            project,
            Some(EdgeKind::BelongsTo.as_str()),
            Direction::In,
        )?;
        Ok(Self::only_files(neighbors))
    }

    /// Returns every file carrying a tag.
    ///
    /// # Errors
    ///
    /// Returns an error if a store read fails.
    pub fn files_with_tag(&self, tag: &str) -> Result<Vec<Neighbor>> {
        let neighbors = self.graph.neighbors(
            EntityKind::Tag.as_str(),
            tag,
            Some(EdgeKind::TaggedWith.as_str()),
            Direction::In,
        )?;
        Ok(Self::only_files(neighbors))
    }

    fn only_files(neighbors: Vec<Neighbor>) -> Vec<Neighbor> {
        neighbors
            .into_iter()
            .filter(|n| n.entity_type == EntityKind::File.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryGraphStore;

    fn builder() -> GraphBuilder<InMemoryGraphStore> {
        GraphBuilder::new(FileGraph::new(InMemoryGraphStore::new()))
    }

    fn sample_files() -> Vec<FileRecord> {
        vec![
            FileRecord::new("1", "invoice.pdf")
                .with_project("Acme")
                .with_tags(["finance", "2026"]),
            FileRecord::new("2", "contract.pdf").with_project("Acme"),
            FileRecord::new("3", "notes.md").with_tag("finance"),
        ]
    }

    #[test]
    fn test_rebuild_populates_graph() {
        let builder = builder();
        let stats = builder
            .rebuild(sample_files(), vec![FileLink::new("1", "2", 0.8)])
            .unwrap();

        // 3 files + 1 project + 2 tags
        assert_eq!(stats.total_nodes, 6);
        assert_eq!(stats.nodes_by_type.get("file"), Some(&3));
        assert_eq!(stats.edges_by_type.get("belongs_to"), Some(&2));
        assert_eq!(stats.edges_by_type.get("tagged_with"), Some(&3));
        assert_eq!(stats.edges_by_type.get("related_to"), Some(&1));
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let builder = builder();
        let links = vec![FileLink::new("1", "2", 0.8)];

        let first = builder.rebuild(sample_files(), links.clone()).unwrap();
        let second = builder.rebuild(sample_files(), links).unwrap();

        assert_eq!(first, second);

        // Weights did not double either.
        let members = builder.files_in_project("Acme").unwrap();
        assert!(members
            .iter()
            .all(|n| (n.weight - 1.0).abs() < f64::EPSILON));
    }

    #[test]
    fn test_rebuild_preserves_handles_and_unmanaged_edges() {
        let builder = builder();
        builder.rebuild(sample_files(), Vec::new()).unwrap();

        let graph = builder.graph();
        let before = graph.lookup("file", "1").unwrap().unwrap();
        graph
            .observe_edge("file", "1", "person", "alice", "shared_with", 1.0, None)
            .unwrap();

        builder.rebuild(sample_files(), Vec::new()).unwrap();

        let after = graph.lookup("file", "1").unwrap().unwrap();
        assert_eq!(before, after);
        let stats = graph.stats().unwrap();
        assert_eq!(stats.edges_by_type.get("shared_with"), Some(&1));
    }

    #[test]
    fn test_files_in_project() {
        let builder = builder();
        builder.rebuild(sample_files(), Vec::new()).unwrap();

        let members = builder.files_in_project("Acme").unwrap();
        let ids: Vec<&str> = members.iter().map(|n| n.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(members[0].label.as_deref(), Some("invoice.pdf"));
    }

    #[test]
    fn test_files_with_tag() {
        let builder = builder();
        builder.rebuild(sample_files(), Vec::new()).unwrap();

        let tagged = builder.files_with_tag("finance").unwrap();
        let ids: Vec<&str> = tagged.iter().map(|n| n.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_unknown_project_is_empty() {
        let builder = builder();
        assert!(builder.files_in_project("Nowhere").unwrap().is_empty());
    }

    #[test]
    fn test_empty_tags_are_skipped() {
        let builder = builder();
        let files = vec![FileRecord::new("1", "a.pdf").with_tags(["", "real"])];
        let stats = builder.rebuild(files, Vec::new()).unwrap();

        assert_eq!(stats.edges_by_type.get("tagged_with"), Some(&1));
        assert_eq!(stats.nodes_by_type.get("tag"), Some(&1));
    }
}
