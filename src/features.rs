//! Feature data model: flat BED-like features and the gene → transcript →
//! exon tree.
//!
//! The tree is stored as an arena ([`FeatureTree`]) of [`FeatureNode`]s
//! linked by indices, so nodes can be visited in flattened order without
//! owning references between parents and children.

use serde::{Deserialize, Serialize};

use crate::{location::GenomicLocation, traits::GenericRange, Position};

/// A flat feature from a BED file or BED-regions search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BedFeature {
    #[serde(rename = "loc")]
    pub location: GenomicLocation,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl BedFeature {
    pub fn new(location: GenomicLocation, name: impl Into<String>) -> Self {
        Self {
            location,
            name: name.into(),
            score: None,
            tags: Vec::new(),
        }
    }
}

impl GenericRange for BedFeature {
    fn start(&self) -> Position {
        self.location.start()
    }
    fn end(&self) -> Position {
        self.location.end()
    }
}

/// A chromosome band and its Giemsa stain (`gneg`, `gpos50`, `acen`, ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cytoband {
    #[serde(rename = "loc")]
    pub location: GenomicLocation,
    pub name: String,
    #[serde(default)]
    pub giemsa_stain: String,
}

impl Cytoband {
    /// Centromeric bands, drawn as the ideogram's waist.
    pub fn is_centromere(&self) -> bool {
        self.giemsa_stain == "acen"
    }
}

impl GenericRange for Cytoband {
    fn start(&self) -> Position {
        self.location.start()
    }
    fn end(&self) -> Position {
        self.location.end()
    }
}

impl From<Cytoband> for BedFeature {
    /// The stain is kept as the only tag.
    fn from(band: Cytoband) -> Self {
        BedFeature {
            location: band.location,
            name: band.name,
            score: None,
            tags: vec![band.giemsa_stain],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureLevel {
    Gene,
    Transcript,
    Exon,
    #[serde(other)]
    Other,
}

/// A gene-model feature as returned by a genome overlap search, with its
/// children nested.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenomicFeature {
    #[serde(rename = "loc")]
    pub location: GenomicLocation,
    pub level: FeatureLevel,
    #[serde(default)]
    pub gene_symbol: Option<String>,
    #[serde(default)]
    pub gene_id: Option<String>,
    #[serde(default)]
    pub gene_type: Option<String>,
    #[serde(default)]
    pub transcript_id: Option<String>,
    #[serde(default)]
    pub transcript_type: Option<String>,
    #[serde(default)]
    pub is_canonical: bool,
    #[serde(default)]
    pub exon_id: Option<String>,
    #[serde(default)]
    pub exon_number: Option<u32>,
    #[serde(default)]
    pub children: Vec<GenomicFeature>,
}

/// One node of a [`FeatureTree`].
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureNode {
    pub location: GenomicLocation,
    pub level: FeatureLevel,
    pub gene_symbol: Option<String>,
    pub gene_id: Option<String>,
    pub transcript_id: Option<String>,
    pub exon_id: Option<String>,
    pub is_canonical: bool,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

impl FeatureNode {
    /// Length of the label drawn next to this feature, in characters.
    pub fn label_len(&self) -> usize {
        self.gene_symbol.as_ref().map_or(0, |s| s.chars().count())
    }
}

impl GenericRange for FeatureNode {
    fn start(&self) -> Position {
        self.location.start()
    }
    fn end(&self) -> Position {
        self.location.end()
    }
}

/// An arena of gene-model features. Roots are genes in encounter order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureTree {
    nodes: Vec<FeatureNode>,
    roots: Vec<usize>,
}

impl FeatureTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten nested features into an arena.
    pub fn from_features(features: &[GenomicFeature]) -> Self {
        let mut tree = FeatureTree::new();
        for feature in features {
            let index = tree.insert(feature, None);
            tree.roots.push(index);
        }
        tree
    }

    fn insert(&mut self, feature: &GenomicFeature, parent: Option<usize>) -> usize {
        let index = self.nodes.len();
        let gene_symbol = feature.gene_symbol.clone().or_else(|| {
            parent.and_then(|p| self.nodes[p].gene_symbol.clone())
        });
        self.nodes.push(FeatureNode {
            location: feature.location.clone(),
            level: feature.level,
            gene_symbol,
            gene_id: feature.gene_id.clone(),
            transcript_id: feature.transcript_id.clone(),
            exon_id: feature.exon_id.clone(),
            is_canonical: feature.is_canonical,
            parent,
            children: Vec::new(),
        });
        for child in &feature.children {
            let child_index = self.insert(child, Some(index));
            self.nodes[index].children.push(child_index);
        }
        index
    }

    /// Add a gene root. Returns its node index.
    pub fn push_gene(&mut self, location: GenomicLocation, symbol: &str) -> usize {
        let index = self.push_node(location, FeatureLevel::Gene, Some(symbol.to_string()), None);
        self.roots.push(index);
        index
    }

    /// Add a transcript under `gene`, inheriting the gene's symbol.
    pub fn push_transcript(&mut self, gene: usize, location: GenomicLocation) -> usize {
        let symbol = self.nodes.get(gene).and_then(|g| g.gene_symbol.clone());
        self.push_node(location, FeatureLevel::Transcript, symbol, Some(gene))
    }

    /// Add an exon under `transcript`.
    pub fn push_exon(&mut self, transcript: usize, location: GenomicLocation) -> usize {
        let symbol = self.nodes.get(transcript).and_then(|t| t.gene_symbol.clone());
        self.push_node(location, FeatureLevel::Exon, symbol, Some(transcript))
    }

    fn push_node(
        &mut self,
        location: GenomicLocation,
        level: FeatureLevel,
        gene_symbol: Option<String>,
        parent: Option<usize>,
    ) -> usize {
        let index = self.nodes.len();
        self.nodes.push(FeatureNode {
            location,
            level,
            gene_symbol,
            gene_id: None,
            transcript_id: None,
            exon_id: None,
            is_canonical: false,
            parent,
            children: Vec::new(),
        });
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(p)) {
            p.children.push(index);
        }
        index
    }

    pub fn node(&self, index: usize) -> Option<&FeatureNode> {
        self.nodes.get(index)
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut FeatureNode> {
        self.nodes.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over the genes (roots) in encounter order.
    pub fn genes(&self) -> impl Iterator<Item = &FeatureNode> + '_ {
        self.roots.iter().map(move |&i| &self.nodes[i])
    }

    pub fn num_genes(&self) -> usize {
        self.roots.len()
    }

    /// Iterate over the children of `node`.
    pub fn children<'a>(
        &'a self,
        node: &'a FeatureNode,
    ) -> impl Iterator<Item = &'a FeatureNode> + 'a {
        node.children.iter().map(move |&i| &self.nodes[i])
    }

    /// Iterate over `((gene_index, transcript_index), transcript)` in encounter
    /// order; the indices are positions among roots and among a gene's children.
    pub fn transcripts(&self) -> impl Iterator<Item = ((usize, usize), &FeatureNode)> + '_ {
        self.roots.iter().enumerate().flat_map(move |(gi, &g)| {
            self.nodes[g]
                .children
                .iter()
                .enumerate()
                .map(move |(ti, &t)| ((gi, ti), &self.nodes[t]))
        })
    }

    pub fn num_transcripts(&self) -> usize {
        self.roots.iter().map(|&g| self.nodes[g].children.len()).sum()
    }

    /// A copy of this tree keeping only canonical transcripts. Genes with no
    /// canonical transcript are dropped.
    pub fn canonical_only(&self) -> FeatureTree {
        let mut tree = FeatureTree::new();
        for gene in self.genes() {
            let canonical: Vec<&FeatureNode> =
                self.children(gene).filter(|t| t.is_canonical).collect();
            if canonical.is_empty() {
                continue;
            }
            let g = tree.copy_node(gene, None);
            tree.roots.push(g);
            for transcript in canonical {
                let t = tree.copy_node(transcript, Some(g));
                for exon in self.children(transcript) {
                    tree.copy_node(exon, Some(t));
                }
            }
        }
        tree
    }

    fn copy_node(&mut self, node: &FeatureNode, parent: Option<usize>) -> usize {
        let index = self.nodes.len();
        self.nodes.push(FeatureNode {
            parent,
            children: Vec::new(),
            ..node.clone()
        });
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(p)) {
            p.children.push(index);
        }
        index
    }
}
