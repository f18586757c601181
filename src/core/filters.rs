use crate::models::Destination;

/// Category excluded by default: stores that only serve medicinal customers
pub const MEDICINAL_ONLY_CATEGORY: &str = "Medicinal cannabis only";

/// Business rule deciding which destinations may be matched
///
/// A destination is eligible unless its category equals one of the excluded
/// categories, compared case-insensitively after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityFilter {
    excluded_categories: Vec<String>,
}

impl EligibilityFilter {
    pub fn new<I, S>(excluded_categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            excluded_categories: excluded_categories
                .into_iter()
                .map(|c| c.as_ref().trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .collect(),
        }
    }

    /// Filter that accepts every destination
    pub fn allow_all() -> Self {
        Self { excluded_categories: Vec::new() }
    }

    #[inline]
    pub fn is_eligible(&self, destination: &Destination) -> bool {
        let category = destination.category.trim().to_lowercase();
        !self.excluded_categories.contains(&category)
    }
}

impl Default for EligibilityFilter {
    fn default() -> Self {
        Self::new([MEDICINAL_ONLY_CATEGORY])
    }
}

/// Ordered, non-owning view over the destinations that passed filtering
///
/// Iteration order is the order of the source collection, which is what
/// makes nearest-match tie-breaking deterministic.
#[derive(Debug, Clone)]
pub struct DestinationIndex<'a> {
    destinations: Vec<&'a Destination>,
    candidates: usize,
}

impl<'a> DestinationIndex<'a> {
    /// Build an index retaining only the candidates accepted by `predicate`
    pub fn new<F>(candidates: &'a [Destination], predicate: F) -> Self
    where
        F: Fn(&Destination) -> bool,
    {
        let destinations: Vec<&'a Destination> =
            candidates.iter().filter(|d| predicate(d)).collect();

        tracing::debug!(
            "Destination index retained {} of {} candidates",
            destinations.len(),
            candidates.len()
        );

        Self {
            destinations,
            candidates: candidates.len(),
        }
    }

    pub fn from_filter(candidates: &'a [Destination], filter: &EligibilityFilter) -> Self {
        Self::new(candidates, |d| filter.is_eligible(d))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Destination> + '_ {
        self.destinations.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    /// Number of candidates the index was built from, before filtering
    pub fn candidate_count(&self) -> usize {
        self.candidates
    }
}
