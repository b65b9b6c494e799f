//! Round-robin load balancing strategy.

use std::sync::Arc;
use crate::discovery::ServiceInstance;
use crate::load_balancer::{LoadBalancer, RequestCounter};

/// Round-robin selector.
///
/// Holds no memory of previous pools: each call takes a ticket from the shared
/// counter and indexes the pool it is given at `ticket mod len`. Rotation is
/// only even over the long run when pool membership changes between calls.
#[derive(Debug, Clone)]
pub struct RoundRobin {
    counter: Arc<RequestCounter>,
}

impl RoundRobin {
    pub fn new(counter: Arc<RequestCounter>) -> Self {
        Self { counter }
    }
}

impl LoadBalancer for RoundRobin {
    fn next_instance<'a>(&self, pool: &'a [ServiceInstance]) -> Option<&'a ServiceInstance> {
        if pool.is_empty() {
            return None;
        }

        let ticket = self.counter.next();
        let index = (ticket % pool.len() as u64) as usize;
        pool.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn pool(n: u16) -> Vec<ServiceInstance> {
        (0..n).map(|i| ServiceInstance::new("127.0.0.1", 8080 + i)).collect()
    }

    #[test]
    fn test_round_robin() {
        let lb = RoundRobin::new(Arc::new(RequestCounter::new()));
        let backends = pool(2);

        // A fresh counter issues ticket 1 first, so rotation starts at index 1.
        let s1 = lb.next_instance(&backends).unwrap();
        assert_eq!(s1, &backends[1]);

        let s2 = lb.next_instance(&backends).unwrap();
        assert_eq!(s2, &backends[0]);

        let s3 = lb.next_instance(&backends).unwrap();
        assert_eq!(s3, &backends[1]);
    }

    #[test]
    fn test_each_instance_once_per_cycle() {
        let counter = Arc::new(RequestCounter::starting_at(7));
        let lb = RoundRobin::new(counter.clone());
        let backends = pool(5);

        let mut picked = Vec::new();
        for _ in 0..5 {
            picked.push(lb.next_instance(&backends).unwrap().clone());
        }

        let distinct: HashSet<_> = picked.iter().collect();
        assert_eq!(distinct.len(), 5);
        // Order is fixed by the counter: ticket 8 → index 3, then 4, 0, 1, 2.
        assert_eq!(picked[0], backends[3]);
        assert_eq!(picked[2], backends[0]);
        assert_eq!(counter.value(), 12);
    }

    #[test]
    fn test_empty_pool_takes_no_ticket() {
        let counter = Arc::new(RequestCounter::new());
        let lb = RoundRobin::new(counter.clone());
        assert!(lb.next_instance(&[]).is_none());
        assert_eq!(counter.value(), 0);
    }

    #[test]
    fn test_pool_change_rederives_ring() {
        let lb = RoundRobin::new(Arc::new(RequestCounter::new()));
        let three = pool(3);
        let two = pool(2);

        assert_eq!(lb.next_instance(&three).unwrap(), &three[1]);
        assert_eq!(lb.next_instance(&three).unwrap(), &three[2]);
        // Ticket 3 against a two-instance pool lands on index 1.
        assert_eq!(lb.next_instance(&two).unwrap(), &two[1]);
    }

    #[test]
    fn test_wraparound_is_safe() {
        let lb = RoundRobin::new(Arc::new(RequestCounter::starting_at(u64::MAX - 1)));
        let backends = pool(3);
        // u64::MAX % 3 == 0, then the counter wraps to 0 and 1.
        assert_eq!(lb.next_instance(&backends).unwrap(), &backends[0]);
        assert_eq!(lb.next_instance(&backends).unwrap(), &backends[0]);
        assert_eq!(lb.next_instance(&backends).unwrap(), &backends[1]);
    }
}
