use std::cell::Cell;
use std::rc::Rc;

use proptest::prelude::*;
use sprout::App;

struct Counters {
    not_found: Rc<Cell<u32>>,
    root: Rc<Cell<u32>>,
    commands: Rc<Cell<u32>>,
}

fn app() -> (App, Counters) {
    let counters = Counters {
        not_found: Rc::new(Cell::new(0)),
        root: Rc::new(Cell::new(0)),
        commands: Rc::new(Cell::new(0)),
    };
    let (nf, root, a, b) = (
        counters.not_found.clone(),
        counters.root.clone(),
        counters.commands.clone(),
        counters.commands.clone(),
    );
    let app = App::builder("tool")
        .command("", move |_| {
            root.set(root.get() + 1);
            Ok(())
        })
        .unwrap()
        .command("alpha", move |_| {
            a.set(a.get() + 1);
            Ok(())
        })
        .unwrap()
        .command("beta gamma", move |_| {
            b.set(b.get() + 1);
            Ok(())
        })
        .unwrap()
        .on_not_found(move |_, _| {
            nf.set(nf.get() + 1);
            Ok(())
        })
        .build();
    (app, counters)
}

fn unregistered_path() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,6}", 1..5).prop_filter("must not resolve", |segments| {
        let first = segments[0].as_str();
        first != "alpha" && !(first == "beta" && segments.get(1).map(String::as_str) == Some("gamma"))
    })
}

proptest! {
    #[test]
    fn unregistered_paths_hit_not_found_once(path in unregistered_path()) {
        let (app, counters) = app();
        prop_assert!(app.parse(path).is_ok());
        prop_assert_eq!(counters.not_found.get(), 1);
        prop_assert_eq!(counters.root.get(), 0);
        prop_assert_eq!(counters.commands.get(), 0);
    }

    #[test]
    fn registered_paths_never_hit_not_found(extra in prop::collection::vec("[a-z]{1,6}", 0..3)) {
        let (app, counters) = app();
        let args: Vec<String> = ["beta", "gamma"].iter().map(|s| s.to_string()).chain(extra).collect();
        prop_assert!(app.parse(args).is_ok());
        prop_assert_eq!(counters.not_found.get(), 0);
        prop_assert_eq!(counters.commands.get(), 1);
    }
}
