use bitvec::{bitvec, vec::BitVec};
use std::fmt::{Debug, Display, Formatter};

pub type PlaceIndex = usize;

/**
 * A marking as it is read from a file: a number of tokens for each place.
 * The unfolding only supports markings with at most one token per place; see `get_unsafe_place`.
 */
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Marking {
    pub(crate) place2token: Vec<u64>, //for each place: number of tokens in that place
}

impl Marking {
    pub fn new(size: usize) -> Self {
        Marking {
            place2token: vec![0; size],
        }
    }

    pub fn get_place2token(&self) -> &Vec<u64> {
        &self.place2token
    }

    pub fn from_vec(place2token: Vec<u64>) -> Self {
        Marking {
            place2token: place2token,
        }
    }

    pub fn add_place(&mut self) {
        self.place2token.push(0);
    }

    pub fn get_number_of_places(&self) -> usize {
        self.place2token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.place2token.iter().all(|tokens| *tokens == 0)
    }

    /**
     * Returns the first place that holds more than one token, if any.
     */
    pub fn get_unsafe_place(&self) -> Option<PlaceIndex> {
        self.place2token.iter().position(|tokens| *tokens > 1)
    }

    pub fn marked_places(&self) -> impl Iterator<Item = PlaceIndex> + '_ {
        self.place2token
            .iter()
            .enumerate()
            .filter_map(|(place, tokens)| if *tokens > 0 { Some(place) } else { None })
    }

    /**
     * Forgets the multiplicities. Only meaningful for markings without unsafe places.
     */
    pub fn to_place_set(&self, number_of_places: usize) -> PlaceSet {
        PlaceSet::from_places(number_of_places, self.marked_places())
    }
}

impl From<Vec<u64>> for Marking {
    fn from(value: Vec<u64>) -> Self {
        Self { place2token: value }
    }
}

impl Display for Marking {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for (place, multiplicity) in self.place2token.iter().enumerate() {
            if *multiplicity > 0 {
                if !first {
                    write!(f, ", ")?;
                }
                first = false;
                write!(f, "{}:{}", place, multiplicity)?;
            }
        }
        write!(f, "}}")
    }
}

impl Debug for Marking {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

/**
 * A 1-safe marking: the set of places that hold a token.
 */
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceSet {
    places: BitVec,
}

impl PlaceSet {
    pub fn new(number_of_places: usize) -> Self {
        Self {
            places: bitvec![0; number_of_places],
        }
    }

    pub fn from_places(number_of_places: usize, places: impl IntoIterator<Item = PlaceIndex>) -> Self {
        let mut result = Self::new(number_of_places);
        for place in places {
            result.insert(place);
        }
        result
    }

    pub fn get_number_of_places(&self) -> usize {
        self.places.len()
    }

    /**
     * The same places, in a net with more places.
     */
    pub fn extend_to(&self, number_of_places: usize) -> Self {
        let mut result = self.clone();
        if number_of_places > result.places.len() {
            result.places.resize(number_of_places, false);
        }
        result
    }

    pub fn insert(&mut self, place: PlaceIndex) {
        if place >= self.places.len() {
            self.places.resize(place + 1, false);
        }
        self.places.set(place, true);
    }

    pub fn remove(&mut self, place: PlaceIndex) {
        if place < self.places.len() {
            self.places.set(place, false);
        }
    }

    pub fn contains(&self, place: PlaceIndex) -> bool {
        self.places.get(place).map_or(false, |bit| *bit)
    }

    pub fn len(&self) -> usize {
        self.places.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.places.not_any()
    }

    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.places.iter_ones().all(|place| other.contains(place))
    }

    pub fn iter(&self) -> impl Iterator<Item = PlaceIndex> + '_ {
        self.places.iter_ones()
    }

    pub fn first(&self) -> Option<PlaceIndex> {
        self.places.first_one()
    }
}

impl Display for PlaceSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, place) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", place)?;
        }
        write!(f, "}}")
    }
}

impl Debug for PlaceSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::{Marking, PlaceSet};

    #[test]
    fn unsafe_marking() {
        let marking = Marking::from_vec(vec![1, 0, 2]);
        assert_eq!(marking.get_unsafe_place(), Some(2));
        assert_eq!(marking.marked_places().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn place_set_subset() {
        let a = PlaceSet::from_places(4, [1, 3]);
        let b = PlaceSet::from_places(4, [0, 1, 3]);
        assert!(a.is_subset_of(&b));
        assert!(!b.is_subset_of(&a));
        assert_eq!(b.len(), 3);
        assert_eq!(a.to_string(), "{1, 3}");
    }
}
