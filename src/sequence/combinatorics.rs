//! Combinatorial generators over sequences.
//!
//! Every generator yields a lazy sequence of sequences in a documented,
//! reproducible order, and materializes nothing until the consumer forces
//! it; taking a prefix of a huge combinatorial space is cheap.

use std::rc::Rc;

use crate::adt::Pair;

use super::Sequence;

impl<T: Clone + 'static> Sequence<T> {
    /// Every element paired with the remaining elements.
    ///
    /// For `[1, 2, 3]` the selections are `(1, [2, 3])`, `(2, [1, 3])`,
    /// `(3, [1, 2])`: elements are chosen in source order and each
    /// remainder preserves the source order of what is left.
    pub fn selections(&self) -> Sequence<Pair<T, Sequence<T>>> {
        let source = self.clone();
        Sequence::defer(move || {
            source.cases_eager(
                |head, tail| {
                    let rest = {
                        let head = head.clone();
                        tail.selections().map(move |pair| {
                            let chosen = pair.first();
                            Pair::of(chosen, Sequence::cons(head.clone(), pair.second()))
                        })
                    };
                    Sequence::cons(Pair::of(head, tail.clone()), rest)
                },
                || Sequence::empty(),
            )
        })
    }

    /// All permutations, lazily.
    ///
    /// Enumeration is lexicographic by source position: permutations
    /// starting with the first element come first, then those starting
    /// with the second, and so on recursively. The empty sequence has
    /// exactly one permutation, itself.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    ///
    /// let permutations = Sequence::from_vec(vec![1, 2, 3]).permutations();
    /// assert_eq!(permutations.length(), 6);
    /// assert_eq!(
    ///     permutations.first().unwrap().to_vec(),
    ///     vec![1, 2, 3],
    /// );
    /// ```
    pub fn permutations(&self) -> Sequence<Sequence<T>> {
        let source = self.clone();
        Sequence::defer(move || {
            if source.is_empty() {
                return Sequence::cons(Sequence::empty(), Sequence::empty());
            }
            source.selections().flat_map(|selection| {
                let chosen = selection.first();
                selection
                    .second()
                    .permutations()
                    .map(move |permutation| Sequence::cons(chosen.clone(), permutation))
            })
        })
    }

    /// All size-`size` combinations, lazily.
    ///
    /// Each combination preserves the source's relative order, and
    /// combinations containing earlier elements enumerate first; for
    /// `[1..5]` and size 3 the first is `[1, 2, 3]` and the last is
    /// `[3, 4, 5]`. Choosing zero elements yields exactly the empty
    /// combination; choosing more than the length yields nothing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    ///
    /// let combinations = Sequence::range(1, 5).combinations(3);
    /// assert_eq!(combinations.length(), 10);
    /// ```
    pub fn combinations(&self, size: usize) -> Sequence<Sequence<T>> {
        if size == 0 {
            return Sequence::cons(Sequence::empty(), Sequence::empty());
        }
        let source = self.clone();
        Sequence::defer(move || {
            source.cases(
                |head, tail| {
                    let with_head = {
                        let head = head.clone();
                        tail.combinations(size - 1)
                            .map(move |combination| Sequence::cons_deferred(head.clone(), combination))
                    };
                    with_head.append(&tail.combinations(size))
                },
                || Sequence::empty(),
            )
        })
    }

    /// All subsequences, lazily; 2ⁿ of them for n elements.
    ///
    /// Each subsequence preserves the source's relative order. For a
    /// non-empty sequence the enumeration recurses on the tail, listing
    /// each tail-subsequence first with the head prepended and then
    /// without it; the empty subsequence therefore comes last.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    ///
    /// let subsequences = Sequence::from_vec(vec![1, 2]).subsequences();
    /// let collected: Vec<Vec<i32>> = subsequences.map(|s| s.to_vec()).to_vec();
    /// assert_eq!(collected, vec![vec![1, 2], vec![2], vec![1], vec![]]);
    /// ```
    pub fn subsequences(&self) -> Sequence<Sequence<T>> {
        let source = self.clone();
        Sequence::defer(move || {
            source.cases(
                |head, tail| {
                    tail.subsequences().flat_map(move |subsequence| {
                        let with_head = Sequence::cons_deferred(head.clone(), subsequence.clone());
                        Sequence::cons(with_head, Sequence::cons(subsequence, Sequence::empty()))
                    })
                },
                || Sequence::cons(Sequence::empty(), Sequence::empty()),
            )
        })
    }

    /// All splits into non-empty contiguous runs, lazily.
    ///
    /// There are 2ⁿ⁻¹ partitions of n elements. The enumeration recurses
    /// on the tail: for each tail partition, isolating the head as its
    /// own run comes before merging the head into the first run. The
    /// empty sequence has exactly one partition, the empty one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::sequence::Sequence;
    ///
    /// let partitions = Sequence::from_vec(vec![1, 2, 3]).partitions();
    /// assert_eq!(partitions.length(), 4);
    ///
    /// let first: Vec<Vec<i32>> = partitions
    ///     .first()
    ///     .unwrap()
    ///     .map(|run| run.to_vec())
    ///     .to_vec();
    /// assert_eq!(first, vec![vec![1], vec![2], vec![3]]);
    /// ```
    pub fn partitions(&self) -> Sequence<Sequence<Sequence<T>>> {
        let source = self.clone();
        Sequence::defer(move || {
            source.cases_eager(
                |head, tail| {
                    if tail.is_empty() {
                        let only_run = Sequence::cons(head, Sequence::empty());
                        return Sequence::cons(
                            Sequence::cons(only_run, Sequence::empty()),
                            Sequence::empty(),
                        );
                    }
                    let head = Rc::new(head);
                    tail.partitions().flat_map(move |partition| {
                        let isolated = Sequence::cons(
                            Sequence::cons((*head).clone(), Sequence::empty()),
                            partition.clone(),
                        );
                        let merged = partition.cases_eager(
                            |first_run, other_runs| {
                                Sequence::cons(
                                    Sequence::cons((*head).clone(), first_run),
                                    other_runs,
                                )
                            },
                            || Sequence::empty(),
                        );
                        Sequence::cons(isolated, Sequence::cons(merged, Sequence::empty()))
                    })
                },
                || Sequence::cons(Sequence::empty(), Sequence::empty()),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn combinations_of_five_choose_three() {
        let combinations = Sequence::range(1, 5).combinations(3);
        let collected: Vec<Vec<i64>> = combinations.map(|c| c.to_vec()).to_vec();

        assert_eq!(collected.len(), 10);
        assert_eq!(collected[0], vec![1, 2, 3]);
        assert_eq!(collected[9], vec![3, 4, 5]);
        for combination in &collected {
            assert_eq!(combination.len(), 3);
            assert!(combination.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }

    #[rstest]
    fn permutations_enumerate_in_source_order() {
        let permutations = Sequence::from_vec(vec![1, 2, 3]).permutations();
        let collected: Vec<Vec<i32>> = permutations.map(|p| p.to_vec()).to_vec();

        assert_eq!(
            collected,
            vec![
                vec![1, 2, 3],
                vec![1, 3, 2],
                vec![2, 1, 3],
                vec![2, 3, 1],
                vec![3, 1, 2],
                vec![3, 2, 1],
            ]
        );
    }

    #[rstest]
    fn subsequences_count_doubles_per_element() {
        let subsequences = Sequence::from_vec(vec![1, 2, 3]).subsequences();
        assert_eq!(subsequences.length(), 8);
    }

    #[rstest]
    fn partitions_cover_all_contiguous_splits() {
        let partitions = Sequence::from_vec(vec![1, 2, 3]).partitions();
        let collected: Vec<Vec<Vec<i32>>> = partitions
            .map(|partition| partition.map(|run| run.to_vec()).to_vec())
            .to_vec();

        assert_eq!(
            collected,
            vec![
                vec![vec![1], vec![2], vec![3]],
                vec![vec![1, 2], vec![3]],
                vec![vec![1], vec![2, 3]],
                vec![vec![1, 2, 3]],
            ]
        );
    }

    #[rstest]
    fn generators_stay_lazy_on_large_inputs() {
        // 20! permutations would never materialize; taking one is instant
        let first = Sequence::range(1, 20).permutations().first().unwrap();
        assert_eq!(first.length(), 20);
    }
}
