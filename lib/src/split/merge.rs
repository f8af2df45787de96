use std::collections::HashMap;
use std::hash::Hash;

/// Result of merging two ordered lists of the same kind of item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMergeResult<T> {
    /// Every item of both lists, once, in an order compatible with both inputs where possible.
    /// Items in both lists are taken from the server side.
    pub merged: Vec<T>,

    /// Items only in the client list
    pub client_only: Vec<T>,

    /// Items only in the server list
    pub server_only: Vec<T>,
}

/// Merge the client and server versions of a list, matching items by `key`
///
/// Walks both lists in step. Matching heads are emitted once. Otherwise a client head with no
/// counterpart left in the server list is client-only, and then a server head with no counterpart
/// left in the client list is server-only. When both heads have counterparts further down (the
/// lists order shared items differently), the server head is emitted together with its client
/// counterpart, which keeps the walk moving.
pub fn merge_lists<T, K, F>(client: &[T], server: &[T], key: F) -> ListMergeResult<T>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let client_keys: Vec<K> = client.iter().map(&key).collect();
    let server_keys: Vec<K> = server.iter().map(&key).collect();

    // Number of not-yet-consumed items per key
    let mut client_left: HashMap<&K, usize> = HashMap::new();
    for key in &client_keys {
        *client_left.entry(key).or_default() += 1;
    }
    let mut server_left: HashMap<&K, usize> = HashMap::new();
    for key in &server_keys {
        *server_left.entry(key).or_default() += 1;
    }

    let mut client_consumed = vec![false; client.len()];
    let mut result = ListMergeResult {
        merged: Vec::with_capacity(client.len().max(server.len())),
        client_only: vec![],
        server_only: vec![],
    };
    let mut client_idx = 0;
    let mut server_idx = 0;

    loop {
        while client_idx < client.len() && client_consumed[client_idx] {
            client_idx += 1;
        }
        let client_head = client_keys.get(client_idx);
        let server_head = server_keys.get(server_idx);

        match (client_head, server_head) {
            (None, None) => break,

            (Some(c), Some(s)) if c == s => {
                result.merged.push(server[server_idx].clone());
                decrement(&mut client_left, c);
                decrement(&mut server_left, s);
                client_idx += 1;
                server_idx += 1;
            }

            (Some(c), _) if !server_left.contains_key(c) => {
                result.merged.push(client[client_idx].clone());
                result.client_only.push(client[client_idx].clone());
                decrement(&mut client_left, c);
                client_idx += 1;
            }

            (_, Some(s)) if !client_left.contains_key(s) => {
                result.merged.push(server[server_idx].clone());
                result.server_only.push(server[server_idx].clone());
                decrement(&mut server_left, s);
                server_idx += 1;
            }

            (_, Some(s)) => {
                // The counterpart is somewhere after the client head
                let counterpart = (client_idx + 1..client.len())
                    .find(|&idx| !client_consumed[idx] && client_keys[idx] == *s);
                if let Some(idx) = counterpart {
                    client_consumed[idx] = true;
                }
                result.merged.push(server[server_idx].clone());
                decrement(&mut client_left, s);
                decrement(&mut server_left, s);
                server_idx += 1;
            }

            // Unreachable: with the server list exhausted the client head has no counterpart left
            (Some(c), None) => {
                result.merged.push(client[client_idx].clone());
                result.client_only.push(client[client_idx].clone());
                decrement(&mut client_left, c);
                client_idx += 1;
            }
        }
    }

    result
}

fn decrement<K: Eq + Hash>(left: &mut HashMap<&K, usize>, key: &K) {
    if let Some(count) = left.get_mut(key) {
        *count -= 1;
        if *count == 0 {
            left.remove(key);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn merge(client: &[&'static str], server: &[&'static str]) -> ListMergeResult<&'static str> {
        merge_lists(client, server, |item| *item)
    }

    /// The merged list has every key exactly once and keeps the relative order of both inputs
    fn check_order(client: &[&str], server: &[&str], result: &ListMergeResult<&str>) {
        let mut expected: Vec<&str> = client.iter().chain(server).copied().collect();
        expected.sort_unstable();
        expected.dedup();
        let mut merged = result.merged.clone();
        merged.sort_unstable();
        assert_eq!(merged, expected);

        for side in [client, server] {
            let positions: Vec<usize> = side
                .iter()
                .map(|item| result.merged.iter().position(|m| m == item).unwrap())
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }

    /// Every key of either list ends up merged exactly once, and exclusives keep their side's order
    fn check_union(client: &[&str], server: &[&str], result: &ListMergeResult<&str>) {
        for key in client.iter().chain(server) {
            let count = result.merged.iter().filter(|item| *item == key).count();
            assert_eq!(count, 1, "{:?} in merge of {:?} and {:?}", key, client, server);
        }
        assert_eq!(result.merged.len(), {
            let mut keys: Vec<&str> = client.iter().chain(server).copied().collect();
            keys.sort_unstable();
            keys.dedup();
            keys.len()
        });

        let client_only: Vec<&str> =
            client.iter().filter(|c| !server.contains(*c)).copied().collect();
        let server_only: Vec<&str> =
            server.iter().filter(|s| !client.contains(*s)).copied().collect();
        assert_eq!(result.client_only, client_only);
        assert_eq!(result.server_only, server_only);
    }

    /// Every sequence of distinct letters from `alphabet`, the empty one included
    fn sequences(alphabet: &[&'static str]) -> Vec<Vec<&'static str>> {
        let mut all = vec![vec![]];
        let mut frontier: Vec<Vec<&'static str>> = vec![vec![]];
        while !frontier.is_empty() {
            let mut next = vec![];
            for prefix in &frontier {
                for letter in alphabet {
                    if !prefix.contains(letter) {
                        let mut longer = prefix.clone();
                        longer.push(*letter);
                        next.push(longer);
                    }
                }
            }
            all.extend(next.iter().cloned());
            frontier = next;
        }
        all
    }

    #[test]
    fn identical_lists() {
        let list = ["a", "b", "c"];
        let result = merge(&list, &list);
        assert_eq!(result.merged, list);
        assert!(result.client_only.is_empty());
        assert!(result.server_only.is_empty());
    }

    #[test]
    fn empty_server() {
        let list = ["a", "b", "c"];
        let result = merge(&list, &[]);
        assert_eq!(result.merged, list);
        assert_eq!(result.client_only, list);
        assert!(result.server_only.is_empty());

        let result = merge(&[], &list);
        assert_eq!(result.merged, list);
        assert_eq!(result.server_only, list);
    }

    #[test]
    fn interleaved_exclusives() {
        let client = ["init", "render", "tick", "draw", "close"];
        let server = ["init", "tick", "save", "close"];
        let result = merge(&client, &server);
        assert_eq!(result.merged, ["init", "render", "tick", "draw", "save", "close"]);
        assert_eq!(result.client_only, ["render", "draw"]);
        assert_eq!(result.server_only, ["save"]);
        check_order(&client, &server, &result);
    }

    #[test]
    fn reordered_shared_items_terminate() {
        let client = ["a", "b", "c"];
        let server = ["c", "b", "a"];
        let result = merge(&client, &server);
        assert_eq!(result.merged, ["c", "b", "a"]);
        assert!(result.client_only.is_empty());
        assert!(result.server_only.is_empty());
        check_union(&client, &server, &result);

        let client = ["x", "a", "b", "y"];
        let server = ["b", "z", "a"];
        let result = merge(&client, &server);
        assert_eq!(result.merged, ["x", "b", "z", "a", "y"]);
        check_union(&client, &server, &result);
    }

    #[test]
    fn every_pair_of_small_lists() {
        let lists = sequences(&["a", "b", "c", "d"]);
        assert_eq!(lists.len(), 65);
        for client in &lists {
            for server in &lists {
                let result = merge(client, server);
                check_union(client, server, &result);

                let shared_in_client: Vec<&str> =
                    client.iter().filter(|c| server.contains(*c)).copied().collect();
                let shared_in_server: Vec<&str> =
                    server.iter().filter(|s| client.contains(*s)).copied().collect();
                if shared_in_client == shared_in_server {
                    check_order(client, server, &result);
                } else {
                    // Reordered shared items follow the server
                    let positions: Vec<usize> = server
                        .iter()
                        .map(|item| result.merged.iter().position(|m| m == item).unwrap())
                        .collect();
                    assert!(positions.windows(2).all(|w| w[0] < w[1]));
                }
            }
        }
    }

    #[test]
    fn duplicate_names_with_distinct_keys() {
        #[derive(Clone, Debug, PartialEq)]
        struct Member(&'static str, &'static str);

        let client = [Member("get", "()I"), Member("get", "()J")];
        let server = [Member("get", "()I")];
        let result = merge_lists(&client, &server, |m| (m.0, m.1));
        assert_eq!(result.merged, client);
        assert_eq!(result.client_only, [Member("get", "()J")]);
    }
}
