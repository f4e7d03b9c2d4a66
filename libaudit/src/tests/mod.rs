mod htlc_audit_tests;
