use rand::seq::SliceRandom;
use rand::Rng;

use super::types::NumberedBox;

/// Lay out boxes 1..=n holding a uniformly random permutation of 1..=n
pub fn shuffled_boxes<R: Rng + ?Sized>(n: u32, rng: &mut R) -> Vec<NumberedBox> {
    let mut contents: Vec<u32> = (1..=n).collect();
    contents.shuffle(rng);

    contents
        .into_iter()
        .zip(1..=n)
        .map(|(inside, box_number)| NumberedBox::new(box_number, inside))
        .collect()
}

/// Check that both box numbers and contents are exactly {1..=len}
pub fn is_permutation(boxes: &[NumberedBox]) -> bool {
    let n = boxes.len();
    let mut seen_numbers = vec![false; n];
    let mut seen_contents = vec![false; n];

    for b in boxes {
        let (Some(number), Some(inside)) = (slot(b.box_number, n), slot(b.prisoner_number_inside, n)) else {
            return false;
        };
        if seen_numbers[number] || seen_contents[inside] {
            return false;
        }
        seen_numbers[number] = true;
        seen_contents[inside] = true;
    }
    true
}

fn slot(value: u32, n: usize) -> Option<usize> {
    let index = (value as usize).checked_sub(1)?;
    (index < n).then_some(index)
}

/// Lengths of the cycles of a permutation, in order of their smallest box.
///
/// Returns an empty vector when `boxes` is not a permutation.
pub fn cycle_lengths(boxes: &[NumberedBox]) -> Vec<usize> {
    if !is_permutation(boxes) {
        return Vec::new();
    }

    let n = boxes.len();
    let mut next = vec![0usize; n];
    for b in boxes {
        next[b.box_number as usize - 1] = b.prisoner_number_inside as usize - 1;
    }

    let mut visited = vec![false; n];
    let mut lengths = Vec::new();
    for start in 0..n {
        if visited[start] {
            continue;
        }
        let mut length = 0;
        let mut cursor = start;
        while !visited[cursor] {
            visited[cursor] = true;
            cursor = next[cursor];
            length += 1;
        }
        lengths.push(length);
    }
    lengths
}

/// Length of the longest cycle; the chain strategy wins iff this is at most K
pub fn longest_cycle(boxes: &[NumberedBox]) -> usize {
    cycle_lengths(boxes).into_iter().max().unwrap_or(0)
}
