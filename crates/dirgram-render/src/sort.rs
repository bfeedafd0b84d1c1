//! Natural ordering of names.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

use dirgram_core::{FirstKind, NodeKind, SortKey};

/// Compare two strings, treating runs of ASCII digits as numbers.
///
/// `"file2"` sorts before `"file10"`. A digit run sorts before any other
/// character, and equal numbers with different zero padding fall back to the
/// shorter run first.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();

    loop {
        let (x, y) = match (a.peek(), b.peek()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(&x), Some(&y)) => (x, y),
        };

        match (x.is_ascii_digit(), y.is_ascii_digit()) {
            (true, true) => {
                let run_a = digit_run(&mut a);
                let run_b = digit_run(&mut b);
                let ord = compare_numbers(&run_a, &run_b);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {
                if x != y {
                    return x.cmp(&y);
                }
                a.next();
                b.next();
            }
        }
    }
}

fn digit_run(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        run.push(c);
    }
    run
}

fn compare_numbers(a: &str, b: &str) -> Ordering {
    let trimmed_a = a.trim_start_matches('0');
    let trimmed_b = b.trim_start_matches('0');
    trimmed_a
        .len()
        .cmp(&trimmed_b.len())
        .then_with(|| trimmed_a.cmp(trimmed_b))
        .then_with(|| a.len().cmp(&b.len()))
}

/// Sort items by name in natural order.
///
/// With `key`, names are mapped first and the keys compared naturally.
/// With `first`, the two kinds are sorted separately and concatenated.
/// The sort is stable, including when reversed.
pub fn sort_by_name<T>(
    items: &mut [T],
    name: impl Fn(&T) -> &str,
    kind: impl Fn(&T) -> NodeKind,
    key: Option<&SortKey>,
    reverse: bool,
    first: Option<FirstKind>,
) {
    let compare = |a: &T, b: &T| {
        let ord = match key {
            Some(key) => natural_cmp(&key.key(name(a)), &key.key(name(b))),
            None => natural_cmp(name(a), name(b)),
        };
        if reverse { ord.reverse() } else { ord }
    };

    match first {
        None => items.sort_by(compare),
        Some(first) => {
            let rank = |item: &T| match (first, kind(item)) {
                (FirstKind::Containers, NodeKind::Container)
                | (FirstKind::Leaves, NodeKind::Leaf) => 0,
                _ => 1,
            };
            items.sort_by(|a, b| rank(a).cmp(&rank(b)).then_with(|| compare(a, b)));
        }
    }
}
