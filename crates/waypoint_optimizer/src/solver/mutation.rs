use rand::Rng;

use super::chromosome::Chromosome;

/// Applies one randomly chosen move: swap two stops, relocate a stop to
/// another vehicle, or reverse a contiguous segment (2-opt style). All
/// three preserve the exactly-once invariant by construction.
pub fn mutate<R: Rng>(chromosome: &mut Chromosome, rng: &mut R) {
    if chromosome.num_assigned() == 0 {
        return;
    }

    match rng.random_range(0..3u8) {
        0 => swap_stops(chromosome, rng),
        1 => relocate_stop(chromosome, rng),
        _ => reverse_segment(chromosome, rng),
    }

    chromosome.clear_fitness();
}

/// Maps a flat index over all assigned stops to (route, position).
fn locate(chromosome: &Chromosome, flat_index: usize) -> (usize, usize) {
    let mut remaining = flat_index;

    for (route_index, route) in chromosome.routes().iter().enumerate() {
        if remaining < route.len() {
            return (route_index, remaining);
        }
        remaining -= route.len();
    }

    unreachable!("flat index within num_assigned")
}

fn swap_stops<R: Rng>(chromosome: &mut Chromosome, rng: &mut R) {
    let total = chromosome.num_assigned();
    if total < 2 {
        return;
    }

    let first = rng.random_range(0..total);
    let second = rng.random_range(0..total);
    if first == second {
        return;
    }

    let (route_a, pos_a) = locate(chromosome, first);
    let (route_b, pos_b) = locate(chromosome, second);

    let routes = chromosome.routes_mut();
    if route_a == route_b {
        routes[route_a].swap(pos_a, pos_b);
    } else {
        let stop_a = routes[route_a][pos_a];
        let stop_b = routes[route_b][pos_b];
        routes[route_a][pos_a] = stop_b;
        routes[route_b][pos_b] = stop_a;
    }
}

fn relocate_stop<R: Rng>(chromosome: &mut Chromosome, rng: &mut R) {
    let total = chromosome.num_assigned();
    let (source_route, source_pos) = locate(chromosome, rng.random_range(0..total));

    let num_routes = chromosome.routes().len();
    let target_route = rng.random_range(0..num_routes);

    let routes = chromosome.routes_mut();
    let stop = routes[source_route].remove(source_pos);
    let target_pos = rng.random_range(0..=routes[target_route].len());
    routes[target_route].insert(target_pos, stop);
}

fn reverse_segment<R: Rng>(chromosome: &mut Chromosome, rng: &mut R) {
    let candidates: Vec<usize> = chromosome
        .routes()
        .iter()
        .enumerate()
        .filter(|(_, route)| route.len() >= 2)
        .map(|(index, _)| index)
        .collect();

    let Some(&route_index) = candidates.get(rng.random_range(0..candidates.len().max(1))) else {
        return;
    };

    let len = chromosome.routes()[route_index].len();
    let mut start = rng.random_range(0..len);
    let mut end = rng.random_range(0..len);
    if start > end {
        std::mem::swap(&mut start, &mut end);
    }

    chromosome.routes_mut()[route_index][start..=end].reverse();
}
