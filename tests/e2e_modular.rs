//! End-to-end tests against a spawned quoter

mod e2e;
mod mocks;

mod health_tests {
	include!("e2e/health_tests.rs");
}

mod middleware_tests {
	include!("e2e/middleware_tests.rs");
}

mod estimates_tests {
	include!("e2e/estimates_tests.rs");
}

mod quotes_tests {
	include!("e2e/quotes_tests.rs");
}

mod prospects_tests {
	include!("e2e/prospects_tests.rs");
}

mod reconciliation_tests {
	include!("e2e/reconciliation_tests.rs");
}

mod admin_tests {
	include!("e2e/admin_tests.rs");
}
