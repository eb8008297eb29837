use hello_triangle::utils::*;

#[test]
fn handle_set() {
    let mut set = HandlePool::new();
    assert_eq!(set.len(), 0);

    // Spawn handles.
    let e1 = set.create();
    assert!(e1.is_valid());
    assert!(set.is_alive(e1));
    assert_eq!(set.len(), 1);

    let e2 = e1;
    assert!(set.is_alive(e2));
    assert_eq!(set.len(), 1);

    // Nil handles are never alive.
    assert!(!set.is_alive(Handle::nil()));
    assert!(!set.free(Handle::nil()));

    // Free handles.
    assert!(set.free(e2));
    assert!(!set.is_alive(e2));
    assert!(!set.is_alive(e1));
    assert_eq!(set.len(), 0);
}

#[test]
fn index_reuse() {
    let mut set = HandlePool::new();

    let mut v = vec![];
    for _ in 0..10 {
        v.push(set.create());
    }

    assert_eq!(set.len(), 10);
    for e in v.iter() {
        set.free(*e);
    }

    for _ in 0..10 {
        let e = set.create();
        let old = v[e.index() as usize - 1];
        assert_eq!(old.index(), e.index());
        assert!(old.version() != e.version());
    }
}

#[test]
fn index_compact_reuse() {
    let mut set = HandlePool::new();

    let mut v = vec![];
    for round in 0..5 {
        for _ in 0..50 {
            v.push(set.create());
        }

        let size = v.len() / 2;
        for i in 0..size {
            let len = v.len();
            set.free(v.swap_remove((i * 7 + round) % len));
        }
    }

    for i in v {
        set.free(i);
    }

    // Freed indices are handed out again from the lowest one.
    for index in 1..51 {
        let handle = set.create();
        assert_eq!(handle.index(), index);
    }
}
