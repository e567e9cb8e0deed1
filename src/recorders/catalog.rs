// Algorithm catalog
// Display metadata the view shows next to each animation

use serde::Serialize;

/// Asymptotic cost summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Complexity {
    pub best: &'static str,
    pub average: &'static str,
    pub worst: &'static str,
    pub space: &'static str,
}

/// Name, description and complexity of one recordable algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlgorithmInfo {
    /// snake_case key accepted by `FromStr`
    pub key: &'static str,

    /// Human-readable name for UI display
    pub name: &'static str,

    pub description: &'static str,

    pub complexity: Complexity,
}

impl AlgorithmInfo {
    pub(crate) const fn new(
        key: &'static str,
        name: &'static str,
        description: &'static str,
        complexity: [&'static str; 4],
    ) -> Self {
        AlgorithmInfo {
            key,
            name,
            description,
            complexity: Complexity {
                best: complexity[0],
                average: complexity[1],
                worst: complexity[2],
                space: complexity[3],
            },
        }
    }
}

/// Family an algorithm belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmFamily {
    Sorting,
    Searching,
    Graph,
    Pathfinding,
}

/// List every algorithm of a family with its metadata
pub fn list_algorithms(family: AlgorithmFamily) -> Vec<AlgorithmInfo> {
    use super::{GraphAlgorithm, PathAlgorithm, SearchAlgorithm, SortAlgorithm};

    match family {
        AlgorithmFamily::Sorting => SortAlgorithm::ALL.iter().map(|a| a.info()).collect(),
        AlgorithmFamily::Searching => SearchAlgorithm::ALL.iter().map(|a| a.info()).collect(),
        AlgorithmFamily::Graph => GraphAlgorithm::ALL.iter().map(|a| a.info()).collect(),
        AlgorithmFamily::Pathfinding => PathAlgorithm::ALL.iter().map(|a| a.info()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_algorithms() {
        assert_eq!(list_algorithms(AlgorithmFamily::Sorting).len(), 5);
        assert_eq!(list_algorithms(AlgorithmFamily::Searching).len(), 4);
        assert_eq!(list_algorithms(AlgorithmFamily::Graph).len(), 2);
        assert_eq!(list_algorithms(AlgorithmFamily::Pathfinding).len(), 3);
    }

    #[test]
    fn test_keys_are_unique_and_parse_back() {
        use crate::recorders::SortAlgorithm;

        for info in list_algorithms(AlgorithmFamily::Sorting) {
            let parsed: SortAlgorithm = info.key.parse().unwrap();
            assert_eq!(parsed.info(), info);
        }
    }
}
