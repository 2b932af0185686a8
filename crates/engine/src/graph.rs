//! Genre graph and graph-based recommendations
//!
//! The graph is bipartite: movie nodes on one side, genre nodes on the other,
//! with an edge for every genre a movie carries. Two movies are related when
//! they sit within two hops of each other, i.e. share at least one genre.

use reelgraph_core::{Dataset, Genre, Movie, MovieId, RecommenderError, Result};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{error, info};

/// Maximum traversal depth from the seed movie
const GRAPH_RADIUS: usize = 2;

/// Stable identity of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Movie(MovieId),
    Genre(Genre),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Movie { movie_id: MovieId, title: String },
    Genre(Genre),
}

impl Node {
    pub fn key(&self) -> NodeKey {
        match self {
            Node::Movie { movie_id, .. } => NodeKey::Movie(*movie_id),
            Node::Genre(genre) => NodeKey::Genre(*genre),
        }
    }
}

/// Undirected movie–genre graph, static after construction.
///
/// Nodes and adjacency lists keep insertion order, which makes traversal order
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct GenreGraph {
    nodes: Vec<Node>,
    index: HashMap<NodeKey, usize>,
    adjacency: Vec<Vec<usize>>,
    /// title -> first movie node carrying it
    titles: HashMap<String, usize>,
    edge_count: usize,
}

impl GenreGraph {
    pub fn from_movies(movies: &[Movie]) -> Self {
        let mut graph = Self::default();

        for movie in movies {
            let movie_node = graph.add_movie(movie.movie_id, &movie.title);
            for &genre in &movie.genres {
                let genre_node = graph.add_genre(genre);
                graph.add_edge(movie_node, genre_node);
            }
        }

        info!(
            nodes = graph.node_count(),
            movies = graph.movie_count(),
            genres = graph.genre_count(),
            edges = graph.edge_count,
            "Built genre graph"
        );

        graph
    }

    fn add_movie(&mut self, movie_id: MovieId, title: &str) -> usize {
        let idx = match self.index.get(&NodeKey::Movie(movie_id)) {
            Some(&idx) => {
                self.nodes[idx] = Node::Movie {
                    movie_id,
                    title: title.to_string(),
                };
                idx
            }
            None => self.push_node(Node::Movie {
                movie_id,
                title: title.to_string(),
            }),
        };
        self.titles.entry(title.to_string()).or_insert(idx);
        idx
    }

    fn add_genre(&mut self, genre: Genre) -> usize {
        match self.index.get(&NodeKey::Genre(genre)) {
            Some(&idx) => idx,
            None => self.push_node(Node::Genre(genre)),
        }
    }

    fn push_node(&mut self, node: Node) -> usize {
        let idx = self.nodes.len();
        self.index.insert(node.key(), idx);
        self.nodes.push(node);
        self.adjacency.push(Vec::new());
        idx
    }

    fn add_edge(&mut self, a: usize, b: usize) {
        if self.adjacency[a].contains(&b) {
            return;
        }
        self.adjacency[a].push(b);
        self.adjacency[b].push(a);
        self.edge_count += 1;
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn movie_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Movie { .. }))
            .count()
    }

    pub fn genre_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Genre(_)))
            .count()
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.index.contains_key(&key)
    }

    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.index.get(&key).map(|&idx| &self.nodes[idx])
    }

    pub fn neighbors(&self, key: NodeKey) -> Vec<NodeKey> {
        self.index
            .get(&key)
            .map(|&idx| {
                self.adjacency[idx]
                    .iter()
                    .map(|&n| self.nodes[n].key())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Movie node for an exact title. Duplicate titles resolve to the first movie added.
    pub fn movie_by_title(&self, title: &str) -> Option<MovieId> {
        self.titles
            .get(title)
            .and_then(|&idx| match &self.nodes[idx] {
                Node::Movie { movie_id, .. } => Some(*movie_id),
                Node::Genre(_) => None,
            })
    }

    /// Breadth-first search from `start` up to `radius` hops.
    ///
    /// Returns node indices with their distance, in visit order, starting with
    /// `start` itself at distance 0.
    fn bfs_within(&self, start: usize, radius: usize) -> Vec<(usize, usize)> {
        let mut visited = HashSet::from([start]);
        let mut order = vec![(start, 0)];
        let mut queue = VecDeque::from([(start, 0)]);

        while let Some((node, depth)) = queue.pop_front() {
            if depth == radius {
                continue;
            }
            for &next in &self.adjacency[node] {
                if visited.insert(next) {
                    order.push((next, depth + 1));
                    queue.push_back((next, depth + 1));
                }
            }
        }

        order
    }
}

/// A movie reached from the seed through the genre graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphCandidate {
    pub movie_id: MovieId,
    pub title: String,
    /// Genres shared with the seed
    pub shared_genres: usize,
    /// shared_genres / seed genre count
    pub genre_overlap: f64,
}

/// Recommends movies that share genres with a seed movie
#[derive(Debug, Clone)]
pub struct GraphRecommender {
    graph: GenreGraph,
}

impl GraphRecommender {
    pub fn new(graph: GenreGraph) -> Self {
        Self { graph }
    }

    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self::new(GenreGraph::from_movies(dataset.movies()))
    }

    pub fn graph(&self) -> &GenreGraph {
        &self.graph
    }

    /// Movies within two hops of the movie titled `title`, in traversal order,
    /// excluding the seed. No similarity ranking is applied.
    ///
    /// # Errors
    ///
    /// Returns `SeedNotFound` if no movie node has exactly this title.
    pub fn try_recommend(&self, title: &str, top_n: usize) -> Result<Vec<GraphCandidate>> {
        let seed = self
            .graph
            .movie_by_title(title)
            .and_then(|movie_id| self.graph.index.get(&NodeKey::Movie(movie_id)))
            .copied()
            .ok_or_else(|| RecommenderError::SeedNotFound(format!("movie '{}'", title)))?;

        let seed_genres: HashSet<usize> = self.graph.adjacency[seed].iter().copied().collect();

        let candidates = self
            .graph
            .bfs_within(seed, GRAPH_RADIUS)
            .into_iter()
            .filter(|&(node, _)| node != seed)
            .filter_map(|(node, _)| match &self.graph.nodes[node] {
                Node::Movie { movie_id, title } => {
                    let shared_genres = self.graph.adjacency[node]
                        .iter()
                        .filter(|genre| seed_genres.contains(genre))
                        .count();
                    Some(GraphCandidate {
                        movie_id: *movie_id,
                        title: title.clone(),
                        shared_genres,
                        genre_overlap: shared_genres as f64 / seed_genres.len().max(1) as f64,
                    })
                }
                Node::Genre(_) => None,
            })
            .take(top_n)
            .collect();

        Ok(candidates)
    }

    /// Like [`try_recommend`](Self::try_recommend), but an unknown title is
    /// logged and yields an empty list.
    pub fn recommend(&self, title: &str, top_n: usize) -> Vec<GraphCandidate> {
        match self.try_recommend(title, top_n) {
            Ok(results) => results,
            Err(e) => {
                error!(title, error = %e, "Movie not found in the graph");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movies() -> Vec<Movie> {
        vec![
            Movie::new(1, "Toy Story (1995)").with_genres([
                Genre::Animation,
                Genre::Childrens,
                Genre::Comedy,
            ]),
            Movie::new(2, "Clerks (1994)").with_genres([Genre::Comedy]),
            Movie::new(3, "Heat (1995)").with_genres([Genre::Action, Genre::Crime]),
            Movie::new(4, "Aladdin (1992)").with_genres([Genre::Animation, Genre::Childrens]),
            Movie::new(5, "No Genre (1990)"),
        ]
    }

    #[test]
    fn test_graph_shape() {
        let graph = GenreGraph::from_movies(&movies());

        assert_eq!(graph.movie_count(), 5);
        // Animation, Children's, Comedy, Action, Crime
        assert_eq!(graph.genre_count(), 5);
        assert_eq!(graph.edge_count(), 8);
        assert_eq!(graph.node_count(), 10);
        assert!(!graph.contains(NodeKey::Genre(Genre::Drama)));
    }

    #[test]
    fn test_graph_is_bipartite() {
        let graph = GenreGraph::from_movies(&movies());

        for movie_id in 1..=5 {
            for neighbor in graph.neighbors(NodeKey::Movie(movie_id)) {
                assert!(matches!(neighbor, NodeKey::Genre(_)));
            }
        }
        for neighbor in graph.neighbors(NodeKey::Genre(Genre::Comedy)) {
            assert!(matches!(neighbor, NodeKey::Movie(_)));
        }
    }

    #[test]
    fn test_movie_node_carries_title() {
        let graph = GenreGraph::from_movies(&movies());
        match graph.node(NodeKey::Movie(3)) {
            Some(Node::Movie { title, .. }) => assert_eq!(title, "Heat (1995)"),
            other => panic!("Expected movie node, got {:?}", other),
        }
        assert_eq!(graph.movie_by_title("Heat (1995)"), Some(3));
    }

    #[test]
    fn test_recommends_movies_sharing_genres_in_traversal_order() {
        let recommender = GraphRecommender::new(GenreGraph::from_movies(&movies()));

        let results = recommender.try_recommend("Toy Story (1995)", 10).unwrap();
        let titles: Vec<&str> = results.iter().map(|c| c.title.as_str()).collect();

        // Animation reaches Aladdin first, Comedy then reaches Clerks
        assert_eq!(titles, vec!["Aladdin (1992)", "Clerks (1994)"]);
        assert_eq!(results[0].shared_genres, 2);
        assert!((results[0].genre_overlap - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(results[1].shared_genres, 1);
    }

    #[test]
    fn test_shared_genre_is_symmetric() {
        let recommender = GraphRecommender::new(GenreGraph::from_movies(&movies()));

        let from_clerks = recommender.try_recommend("Clerks (1994)", 10).unwrap();
        assert!(from_clerks.iter().any(|c| c.title == "Toy Story (1995)"));

        let from_toy_story = recommender.try_recommend("Toy Story (1995)", 10).unwrap();
        assert!(from_toy_story.iter().any(|c| c.title == "Clerks (1994)"));
    }

    #[test]
    fn test_top_n_truncates() {
        let recommender = GraphRecommender::new(GenreGraph::from_movies(&movies()));
        let results = recommender.try_recommend("Toy Story (1995)", 1).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_movie_without_genres_has_no_candidates() {
        let recommender = GraphRecommender::new(GenreGraph::from_movies(&movies()));
        assert!(recommender
            .try_recommend("No Genre (1990)", 10)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_duplicate_title_seeds_from_first_movie() {
        let graph = GenreGraph::from_movies(&[
            Movie::new(10, "Twin Falls (1998)").with_genres([Genre::Comedy]),
            Movie::new(20, "Twin Falls (1998)").with_genres([Genre::Horror]),
            Movie::new(30, "Clerks (1994)").with_genres([Genre::Comedy]),
        ]);
        assert_eq!(graph.movie_by_title("Twin Falls (1998)"), Some(10));

        let results = GraphRecommender::new(graph)
            .try_recommend("Twin Falls (1998)", 10)
            .unwrap();
        let ids: Vec<MovieId> = results.iter().map(|c| c.movie_id).collect();
        assert_eq!(ids, vec![30]);
    }

    #[test]
    fn test_unknown_title_is_not_found() {
        let recommender = GraphRecommender::new(GenreGraph::from_movies(&movies()));

        let result = recommender.try_recommend("toy story (1995)", 10);
        assert!(matches!(result, Err(RecommenderError::SeedNotFound(_))));
        assert!(recommender.recommend("Missing (2000)", 10).is_empty());
    }
}
