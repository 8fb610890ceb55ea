use nachos_user_tests::test_runner::TestParam;

mod tests;

fn main() {
    env_logger::init();
    TestParam::parse().run(tests::TESTS);
}
