mod common;

use common::Fixture;
use indoc::indoc;
use javasema::analysis::Direction;
use javasema::PrimitiveType;
use pretty_assertions::assert_eq;

const LOOPS: &str = indoc! {r#"
    import java.util.List;

    class Loops {
        static final int LIMIT = 64;

        void run(List<String> items, int[] data, long total) {
            for (int i = 0; i < items.size(); i++) { }
            for (var k = 9; k >= 0; --k) { }
            for (char c = 'a'; c <= 'z'; c += 1) { }
            for (int n = LIMIT; 0 < n; n = n - 1) { }
            for (long m = 0; m != total; m++) { }
            for (int j = 0; j < 10; j++) { j += 2; }
            for (int p = 0, q = 1; p < q; p++) { }
            for (int r = 0; r < r * 2; r++) { }
            for (int s = 0; s < total; s++) { }
            for (double d = 0; d < 1; d++) { }
            for (int t = 0; t < 10; t += 2) { }
            for (int u = 10; u < 20; u--) { }
        }
    }
"#};

/// `(counter, initializer, bound, inclusive, direction, may_overflow)`
type Shape = (String, String, String, bool, Direction, bool);

fn shapes(fixture: &Fixture) -> Vec<Option<Shape>> {
    let session = fixture.session();
    session
        .for_loops()
        .into_iter()
        .map(|l| {
            session.counting_loop(l).map(|c| {
                (
                    c.counter_name().to_string(),
                    fixture.text(c.initializer()).to_string(),
                    fixture.text(c.bound()).to_string(),
                    c.is_inclusive(),
                    c.direction(),
                    c.may_overflow(),
                )
            })
        })
        .collect()
}

fn shape(
    counter: &str,
    init: &str,
    bound: &str,
    inclusive: bool,
    direction: Direction,
    may_overflow: bool,
) -> Option<Shape> {
    Some((
        counter.to_string(),
        init.to_string(),
        bound.to_string(),
        inclusive,
        direction,
        may_overflow,
    ))
}

#[test]
fn test_recognizes_loops_in_source_order() {
    let fixture = Fixture::new(LOOPS);
    let found = shapes(&fixture);
    assert_eq!(
        found,
        vec![
            shape("i", "0", "items.size()", false, Direction::Ascending, false),
            shape("k", "9", "0", true, Direction::Descending, false),
            shape("c", "'a'", "'z'", true, Direction::Ascending, false),
            shape("n", "LIMIT", "0", false, Direction::Descending, false),
            shape("m", "0", "total", false, Direction::Ascending, true),
            // counter reassigned in the body
            None,
            // two declarators
            None,
            // bound depends on the counter
            None,
            // long bound does not fit an int counter
            None,
            // floating point counter
            None,
            // step of two
            None,
            // steps away from the bound
            None,
        ]
    );
}

#[test]
fn test_counter_types() {
    let fixture = Fixture::new(LOOPS);
    let session = fixture.session();
    let types: Vec<PrimitiveType> = session
        .for_loops()
        .into_iter()
        .filter_map(|l| session.counting_loop(l))
        .map(|c| c.counter_type())
        .collect();
    assert_eq!(
        types,
        vec![
            PrimitiveType::Int,
            PrimitiveType::Int,
            PrimitiveType::Char,
            PrimitiveType::Int,
            PrimitiveType::Long,
        ]
    );
}

#[test]
fn test_counter_node_is_the_declarator() {
    let fixture = Fixture::method("", "for (int i = 0; i < 3; i++) { }");
    let session = fixture.session();
    let l = session.for_loops()[0];
    let counting = session.counting_loop(l).unwrap();
    assert_eq!(counting.loop_node(), l);
    assert_eq!(fixture.text(counting.counter()), "i = 0");
}

#[test]
fn test_for_each_and_while_are_not_counting_loops() {
    let fixture = Fixture::method(
        "int[] xs",
        "for (int x : xs) { } int i = 0; while (i < 3) { i++; }",
    );
    let session = fixture.session();
    assert!(session.for_loops().is_empty());
}

#[test]
fn test_condition_must_compare_the_counter() {
    let fixture = Fixture::method("int step", "for (int i = 0; (i = step) < 10; i++) { }");
    let session = fixture.session();
    let l = session.for_loops()[0];
    assert_eq!(session.counting_loop(l), None);
}

#[test]
fn test_narrowing_bounds_must_fit_the_counter() {
    let source = indoc! {r#"
        class Narrow {
            void run() {
                for (byte b = 0; b < 1000; b++) { }
                for (byte b = 0; b <= 127; b++) { }
                for (char c = 0; c != 70000; c++) { }
                for (char c = 0; c != 65535; c++) { }
                for (short s = 0; s < 32768; s++) { }
            }
        }
    "#};
    let fixture = Fixture::new(source);
    let session = fixture.session();
    let bounds: Vec<Option<String>> = session
        .for_loops()
        .into_iter()
        .map(|l| {
            session
                .counting_loop(l)
                .map(|c| fixture.text(c.bound()).to_string())
        })
        .collect();
    assert_eq!(
        bounds,
        vec![
            None,
            Some("127".to_string()),
            None,
            Some("65535".to_string()),
            None,
        ]
    );
}
