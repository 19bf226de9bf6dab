mod exec_tests;
