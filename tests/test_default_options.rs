//! Kept in its own test binary: these tests change the process-wide options.

use plyframes::prelude::*;
use plyframes::{default_options, set_default_options};

fn frame() -> DataFrame {
    DataFrame::new(vec![
        ("a".to_string(), Series::from(vec![1, 2, 3])),
        ("b".to_string(), Series::from(vec![4, 5, 6])),
    ])
    .unwrap()
}

#[test]
fn test_default_dispatcher_follows_later_changes() {
    let dispatcher = Dispatcher::default();
    let explicit = Dispatcher::new(Options::default());

    set_default_options(Options::new().modify_input_data(true));
    assert!(dispatcher.options().modify_input_data);

    let mut data = Dataset::from(frame());
    dispatcher.apply(&mut data, &mutate([("c", "a + b")])).unwrap();
    assert!(data.frame().has_column("c"));

    // explicit options ignore the process-wide value
    let mut untouched = Dataset::from(frame());
    explicit
        .apply(&mut untouched, &mutate([("c", "a + b")]))
        .unwrap();
    assert!(!untouched.frame().has_column("c"));

    set_default_options(Options::default());
    assert_eq!(default_options(), Options::default());

    let mut data = Dataset::from(frame());
    dispatcher.apply(&mut data, &mutate([("c", "a + b")])).unwrap();
    assert!(!data.frame().has_column("c"));
}
