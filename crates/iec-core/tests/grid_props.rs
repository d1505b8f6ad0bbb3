use iec_core::{Grid, IecError};
use proptest::prelude::*;

proptest! {
    #[test]
    fn increasing_arrays_are_accepted(steps in prop::collection::vec(1e-6f64..1.0, 1..64)) {
        let mut s = vec![0.0];
        for step in &steps {
            let next = s[s.len() - 1] + step;
            s.push(next);
        }
        let grid = Grid::new(s.clone()).unwrap();
        prop_assert_eq!(grid.as_slice(), s.as_slice());
        prop_assert!(grid.as_slice().windows(2).all(|pair| pair[1] > pair[0]));
    }

    #[test]
    fn any_descent_is_rejected(
        steps in prop::collection::vec(1e-3f64..1.0, 2..32),
        at in 0usize..31,
    ) {
        let mut s = vec![0.0];
        for step in &steps {
            let next = s[s.len() - 1] + step;
            s.push(next);
        }
        let idx = 1 + at % (s.len() - 1);
        s[idx] = s[idx - 1];
        prop_assert!(matches!(Grid::new(s), Err(IecError::Grid(_))));
    }

    #[test]
    fn uniform_grids_are_monotone(length in 1e-3f64..50.0, n in 2usize..2000) {
        let grid = Grid::uniform(length, n).unwrap();
        prop_assert_eq!(grid.len(), n);
        prop_assert!((grid.length() - length).abs() <= 1e-12 * length);
        prop_assert!(grid.as_slice().windows(2).all(|pair| pair[1] > pair[0]));
    }
}
