// Small finite-domain constraint solver
// Backtracking search with forward checking over binary constraints

use tracing::trace;

type BinaryConstraint<V> = Box<dyn Fn(&V, &V) -> bool>;

/// A constraint satisfaction problem over variables with finite domains
pub struct ConstraintProblem<V> {
    domains: Vec<Vec<V>>,
    /// (first variable, second variable, predicate over their values)
    constraints: Vec<(usize, usize, BinaryConstraint<V>)>,
}

impl<V: Clone> ConstraintProblem<V> {
    pub fn new() -> Self {
        Self {
            domains: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Add a variable and return its index. Values are tried in domain order.
    pub fn add_variable(&mut self, domain: Vec<V>) -> usize {
        self.domains.push(domain);
        self.domains.len() - 1
    }

    /// Add a binary constraint between two variables
    pub fn add_constraint<F>(&mut self, first: usize, second: usize, predicate: F)
    where
        F: Fn(&V, &V) -> bool + 'static,
    {
        debug_assert!(first < self.domains.len() && second < self.domains.len());
        self.constraints.push((first, second, Box::new(predicate)));
    }

    pub fn variable_count(&self) -> usize {
        self.domains.len()
    }

    /// Find the first assignment satisfying every constraint
    ///
    /// Returns the value of each variable in index order, or `None` when the
    /// problem is infeasible. A problem with no variables is trivially solved.
    pub fn solve(&self) -> Option<Vec<V>> {
        let index = self.constraint_index();
        let mut domains = self.domains.clone();
        let mut assignment = Vec::with_capacity(self.domains.len());
        let mut nodes = 0usize;
        let solved = self.backtrack(&mut assignment, &mut domains, &index, &mut nodes);
        trace!(
            "CSP search over {} variables visited {} nodes (solved: {})",
            self.domains.len(),
            nodes,
            solved
        );
        solved.then_some(assignment)
    }

    /// Constraint ids touching each variable
    fn constraint_index(&self) -> Vec<Vec<usize>> {
        let mut index = vec![Vec::new(); self.domains.len()];
        for (id, (a, b, _)) in self.constraints.iter().enumerate() {
            index[*a].push(id);
            if b != a {
                index[*b].push(id);
            }
        }
        index
    }

    fn backtrack(
        &self,
        assignment: &mut Vec<V>,
        domains: &mut [Vec<V>],
        index: &[Vec<usize>],
        nodes: &mut usize,
    ) -> bool {
        let var = assignment.len();
        if var == domains.len() {
            return true;
        }

        let candidates = domains[var].clone();
        for value in candidates {
            *nodes += 1;
            if !self.consistent(var, &value, assignment, index) {
                continue;
            }

            let mut saved = Vec::new();
            if self.forward_check(var, &value, domains, index, &mut saved) {
                assignment.push(value);
                if self.backtrack(assignment, domains, index, nodes) {
                    return true;
                }
                assignment.pop();
            }

            for (neighbour, domain) in saved.into_iter().rev() {
                domains[neighbour] = domain;
            }
        }

        false
    }

    /// Check `value` for `var` against variables that are already assigned
    fn consistent(&self, var: usize, value: &V, assignment: &[V], index: &[Vec<usize>]) -> bool {
        index[var].iter().all(|&id| {
            let (a, b, predicate) = &self.constraints[id];
            if *a == var && *b < assignment.len() {
                predicate(value, &assignment[*b])
            } else if *b == var && *a < assignment.len() {
                predicate(&assignment[*a], value)
            } else {
                true
            }
        })
    }

    /// Prune the domains of unassigned neighbours in place
    ///
    /// The previous domain of every touched neighbour is pushed to `saved` so
    /// the caller can undo the pruning. Returns `false` if a domain empties.
    fn forward_check(
        &self,
        var: usize,
        value: &V,
        domains: &mut [Vec<V>],
        index: &[Vec<usize>],
        saved: &mut Vec<(usize, Vec<V>)>,
    ) -> bool {
        for &id in &index[var] {
            let (a, b, predicate) = &self.constraints[id];
            let neighbour = if *a == var { *b } else { *a };
            if neighbour <= var {
                continue;
            }

            if !saved.iter().any(|(n, _)| *n == neighbour) {
                saved.push((neighbour, domains[neighbour].clone()));
            }
            if *a == var {
                domains[neighbour].retain(|other| predicate(value, other));
            } else {
                domains[neighbour].retain(|other| predicate(other, value));
            }
            if domains[neighbour].is_empty() {
                return false;
            }
        }

        true
    }
}

impl<V: Clone> Default for ConstraintProblem<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_problem_is_solved() {
        let problem: ConstraintProblem<u8> = ConstraintProblem::new();
        assert_eq!(problem.solve(), Some(vec![]));
    }

    #[test]
    fn test_first_solution_follows_domain_order() {
        let mut problem = ConstraintProblem::new();
        let a = problem.add_variable(vec![1, 2, 3]);
        let b = problem.add_variable(vec![1, 2, 3]);
        problem.add_constraint(a, b, |x, y| x != y);

        assert_eq!(problem.solve(), Some(vec![1, 2]));
    }

    #[test]
    fn test_infeasible_problem() {
        let mut problem = ConstraintProblem::new();
        let a = problem.add_variable(vec!["x"]);
        let b = problem.add_variable(vec!["x"]);
        problem.add_constraint(a, b, |x, y| x != y);

        assert_eq!(problem.solve(), None);
    }

    #[test]
    fn test_backtracks_out_of_dead_end() {
        // a < b < c over {1, 2, 3} forces the unique solution 1, 2, 3
        let mut problem = ConstraintProblem::new();
        let a = problem.add_variable(vec![3, 2, 1]);
        let b = problem.add_variable(vec![3, 2, 1]);
        let c = problem.add_variable(vec![3, 2, 1]);
        problem.add_constraint(a, b, |x, y| x < y);
        problem.add_constraint(b, c, |x, y| x < y);

        assert_eq!(problem.solve(), Some(vec![1, 2, 3]));
        assert_eq!(problem.variable_count(), 3);
    }

    #[test]
    fn test_constraint_on_earlier_variable() {
        // Constraint declared as (later, earlier) is still honoured
        let mut problem = ConstraintProblem::new();
        let a = problem.add_variable(vec![1, 2]);
        let b = problem.add_variable(vec![1, 2]);
        problem.add_constraint(b, a, |later, earlier| later > earlier);

        assert_eq!(problem.solve(), Some(vec![1, 2]));
    }

    #[test]
    fn test_pruning_is_undone_on_backtrack() {
        // a = 1 empties c's domain two levels down; b must get 1 back for a = 2
        let mut problem = ConstraintProblem::new();
        let a = problem.add_variable(vec![1, 2]);
        let b = problem.add_variable(vec![1, 2]);
        let c = problem.add_variable(vec![2]);
        problem.add_constraint(a, b, |x, y| x != y);
        problem.add_constraint(b, c, |x, y| x != y);

        assert_eq!(problem.solve(), Some(vec![2, 1, 2]));
        // Solving again starts from the declared domains
        assert_eq!(problem.solve(), Some(vec![2, 1, 2]));
    }

    #[test]
    fn test_long_chain_is_solved() {
        let mut problem = ConstraintProblem::new();
        let vars: Vec<usize> = (0..500)
            .map(|_| problem.add_variable(vec!["Math".to_string(), "Art".to_string()]))
            .collect();
        for pair in vars.windows(2) {
            problem.add_constraint(pair[0], pair[1], |x: &String, y: &String| x != y);
        }

        let solution = problem.solve().unwrap();
        assert_eq!(solution.len(), 500);
        assert!(solution.windows(2).all(|w| w[0] != w[1]));
    }
}
